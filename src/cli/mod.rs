pub mod command_handlers;
pub mod dispatcher;
pub mod interactive;
pub mod main_types;
