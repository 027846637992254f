use thiserror::Error;

/// Fallback text shown when a failure carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Generic text shown for transport and parse failures.
pub const SERVICE_UNREACHABLE_MESSAGE: &str = "Unable to reach the search service";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
    #[error("FormError: {0}")]
    Form(#[from] FormError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("No search endpoint configured for profile '{profile}'")]
    EndpointMissing { profile: String },
    /// A submission finished with an error; carries the displayed text.
    #[error("{0}")]
    SearchFailed(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Could not parse response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },
    #[error("Gateway reported an error: {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    Gateway {
        message: Option<String>,
        /// Errors after the first one, which are not surfaced.
        dropped: usize,
    },
}

impl ApiError {
    /// The single line shown in the error area after a failed submission.
    pub fn display_friendly(&self) -> String {
        match self {
            ApiError::Transport { .. } | ApiError::Parse { .. } => {
                SERVICE_UNREACHABLE_MESSAGE.to_string()
            }
            ApiError::Gateway { message, .. } => match message.as_deref() {
                Some(message) if !message.is_empty() => message.to_string(),
                _ => UNKNOWN_ERROR_MESSAGE.to_string(),
            },
            ApiError::Http {
                status, message, ..
            } => {
                if message.trim().is_empty() {
                    UNKNOWN_ERROR_MESSAGE.to_string()
                } else {
                    format!("HTTP {}: {}", status, message.trim())
                }
            }
            ApiError::Timeout { timeout_secs, .. } => {
                format!("Search request timed out after {}s", timeout_secs)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Unknown group: {0}. Use 'writers', 'publishers' or 'performers'")]
    UnknownGroup(String),
    #[error("Row {index} is out of range for {field} ({len} rows)")]
    IndexOutOfBounds {
        field: String,
        index: usize,
        len: usize,
    },
    #[error("Cannot remove the last row of {field}")]
    LastEntry { field: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration save failed: {message}")]
    ConfigSaveFailed { message: String },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Serialization failed: {0}")]
    Serialize(String),
    #[error("Terminal output error: {0}")]
    TerminalOutput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },
    #[error("Unknown configuration field '{field}'")]
    UnknownField { field: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::Transport { .. } => ErrorSeverity::High,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                ApiError::Gateway { .. } => ErrorSeverity::Low,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(StorageError::ConfigDirNotFound) => ErrorSeverity::Critical,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
            AppError::Form(_) => ErrorSeverity::Low,
        }
    }

    /// Text printed after `Error: ` by the binary.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Cli(CliError::SearchFailed(message)) => message.clone(),
            AppError::Cli(cli_error) => cli_error.to_string(),
            AppError::Api(api_error) => api_error.display_friendly(),
            AppError::Form(form_error) => form_error.to_string(),
            other => other.to_string(),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Cli(CliError::EndpointMissing { .. }) => Some(
                "'worksearch config set endpoint <url>' or set WORKSEARCH_ENDPOINT".to_string(),
            ),
            AppError::Api(ApiError::Transport { .. } | ApiError::Timeout { .. }) => {
                Some("Check your network connection and the configured endpoint".to_string())
            }
            AppError::Config(ConfigError::UnknownField { .. }) => {
                Some("'worksearch config show' lists the configurable fields".to_string())
            }
            AppError::Form(FormError::LastEntry { .. }) => {
                Some("Clear the row with 'edit' instead of removing it".to_string())
            }
            _ => None,
        }
    }
}
