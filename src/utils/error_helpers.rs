use crate::error::{ApiError, DisplayError};

/// Helper functions for turning library errors into [`ApiError`] with endpoint context.
/// Convert a failed send into a transport or timeout error
pub fn convert_request_error(error: reqwest::Error, endpoint: &str, timeout_secs: u64) -> ApiError {
    if error.is_timeout() {
        return convert_timeout_error(endpoint, timeout_secs);
    }

    ApiError::Transport {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

/// Convert timeout errors to ApiError with endpoint context
pub fn convert_timeout_error(endpoint: &str, timeout_secs: u64) -> ApiError {
    ApiError::Timeout {
        timeout_secs,
        endpoint: endpoint.to_string(),
    }
}

/// Convert JSON deserialization errors to ApiError with endpoint context
pub fn convert_json_error(error: serde_json::Error, endpoint: &str) -> ApiError {
    ApiError::Parse {
        endpoint: endpoint.to_string(),
        message: format!("JSON parse error: {}", error),
    }
}

/// Convert serialization errors raised while rendering output
pub fn convert_serialize_error(error: serde_json::Error, what: &str) -> DisplayError {
    DisplayError::Serialize(format!("{}: {}", what, error))
}
