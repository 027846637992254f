pub mod config_service;
pub mod search_service;
pub mod traits;

pub use config_service::ConfigService;
pub use search_service::SearchService;
pub use traits::SearchGateway;
