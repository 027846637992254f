pub use error::AppError;

/// Main architecture layers (dependency flow: CLI → Core → Storage)
pub mod cli; // Command-line interface
pub mod core; // Form model, payload and submission state
pub mod storage; // Profile configuration

/// Support modules (used across layers)
pub mod api; // Work search gateway client
pub mod display; // Result rendering
pub mod error; // Error handling
pub mod utils; // Shared utilities and helpers

pub type Result<T> = std::result::Result<T, AppError>;
