//! Business logic: the form model, payload derivation and submission state.

pub mod form;
pub mod payload;
pub mod services;
pub mod session;
