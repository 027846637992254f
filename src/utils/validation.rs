//! Validation of configuration values entered by the user.

use crate::error::ConfigError;

/// Accepts absolute http(s) URLs with a host.
pub fn validate_url(url: &str) -> crate::Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field: "endpoint".to_string(),
        value: url.to_string(),
        reason: reason.to_string(),
    };

    if url.trim().is_empty() {
        return Err(invalid("URL cannot be empty").into());
    }

    let parsed = reqwest::Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("URL must start with http:// or https://").into());
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL has no host").into());
    }

    Ok(())
}

/// Request timeouts are whole seconds, at least one.
pub fn validate_timeout(value: &str) -> crate::Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            field: "timeout".to_string(),
            value: value.to_string(),
            reason: "expected a positive number of seconds".to_string(),
        }
        .into()),
    }
}

pub fn parse_bool(field: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_valid_urls() {
        assert!(validate_url("http://localhost:4000/graphql").is_ok());
        assert!(validate_url("https://api.example.test/graphql").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_invalid_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("localhost:3000").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_validate_timeout() {
        assert_eq!(validate_timeout("15").unwrap(), 15);
        assert!(validate_timeout("0").is_err());
        assert!(validate_timeout("-3").is_err());
        assert!(validate_timeout("soon").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("integrity-header", "on").unwrap());
        assert!(!parse_bool("integrity-header", "FALSE").unwrap());
        assert!(parse_bool("integrity-header", "maybe").is_err());
    }
}
