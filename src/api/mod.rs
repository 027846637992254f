pub mod client;
pub mod integrity;
pub mod models;
pub mod query;

pub use client::{ClientOptions, WorkSearchClient};
pub use models::{FieldValue, Record, SearchResult};
pub use query::QueryVariant;
