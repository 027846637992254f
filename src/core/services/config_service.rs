use crate::api::query::QueryVariant;
use crate::core::form::RepeatableField;
use crate::core::payload::PartyEncoding;
use crate::display::columns::ColumnStrategyKind;
use crate::error::ConfigError;
use crate::storage::config::{Config, Profile};
use crate::utils::validation::{parse_bool, validate_timeout, validate_url};
use crate::AppError;
use std::path::PathBuf;

/// User-facing names accepted by `config set`.
pub const SETTABLE_FIELDS: [&str; 8] = [
    "endpoint",
    "timeout",
    "integrity-header",
    "variant",
    "columns",
    "writers-encoding",
    "publishers-encoding",
    "performers-encoding",
];

/// Reads and edits profiles in the loaded configuration.
pub struct ConfigService {
    config: Config,
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.config.get_profile(name)
    }

    pub fn get_default_profile(&self) -> Option<&String> {
        self.config.default_profile.as_ref()
    }

    /// Validates and stores one field, creating the profile if needed.
    ///
    /// `columns` takes `first-record`, `union`, or a comma-separated list of
    /// column names, which selects the declared strategy.
    pub fn set_profile_field(
        &mut self,
        profile: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        };

        let is_new = self.config.get_profile(profile).is_none();
        let mut entry = self.config.get_profile(profile).cloned().unwrap_or_default();

        match field {
            "endpoint" => {
                validate_url(value)?;
                entry.endpoint = Some(value.trim().to_string());
            }
            "timeout" => entry.timeout_seconds = Some(validate_timeout(value)?),
            "integrity-header" => entry.integrity_header = Some(parse_bool(field, value)?),
            "variant" => {
                entry.query_variant = Some(value.parse::<QueryVariant>().map_err(invalid)?);
            }
            "columns" => match value.parse::<ColumnStrategyKind>() {
                Ok(ColumnStrategyKind::Declared) => {
                    return Err(invalid(
                        "give the column names, e.g. 'iswc,akas'".to_string(),
                    )
                    .into());
                }
                Ok(kind) => {
                    entry.column_strategy = Some(kind);
                    entry.declared_columns = None;
                }
                Err(_) => {
                    let columns: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect();
                    if columns.is_empty() {
                        return Err(invalid("no column names given".to_string()).into());
                    }
                    entry.column_strategy = Some(ColumnStrategyKind::Declared);
                    entry.declared_columns = Some(columns);
                }
            },
            _ => {
                let group = field
                    .strip_suffix("-encoding")
                    .and_then(|g| g.parse::<RepeatableField>().ok())
                    .ok_or_else(|| ConfigError::UnknownField {
                        field: field.to_string(),
                    })?;
                let encoding = value.parse::<PartyEncoding>().map_err(invalid)?;
                let mut encodings = entry.party_encoding();
                encodings.set(group, encoding);
                entry.party_encoding = Some(encodings);
            }
        }

        self.config.set_profile(profile.to_string(), entry);
        if is_new && self.config.default_profile.is_none() {
            self.config.default_profile = Some(profile.to_string());
        }
        log::debug!("profile '{}': {} = {}", profile, field, value);
        Ok(())
    }

    pub fn save_config(&self, path: Option<PathBuf>) -> Result<(), AppError> {
        self.config.save(path).map_err(|e| e.into())
    }

    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        self.config.profiles.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::columns::ColumnStrategy;
    use tempfile::tempdir;

    #[test]
    fn test_set_endpoint_creates_default_profile() {
        let mut service = ConfigService::new(Config::default());
        service
            .set_profile_field("default", "endpoint", "https://example.test/graphql")
            .unwrap();

        let profile = service.get_profile("default").unwrap();
        assert_eq!(
            profile.endpoint.as_deref(),
            Some("https://example.test/graphql")
        );
        assert_eq!(service.get_default_profile().map(String::as_str), Some("default"));
    }

    #[test]
    fn test_set_endpoint_rejects_bad_url() {
        let mut service = ConfigService::new(Config::default());
        let result = service.set_profile_field("default", "endpoint", "example.test");
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(service.get_profile("default").is_none());
    }

    #[test]
    fn test_set_scalar_fields() {
        let mut service = ConfigService::new(Config::default());
        service.set_profile_field("p", "timeout", "12").unwrap();
        service.set_profile_field("p", "integrity-header", "false").unwrap();
        service.set_profile_field("p", "variant", "compact").unwrap();

        let options = service.get_profile("p").unwrap().client_options();
        assert_eq!(options.timeout_secs, 12);
        assert!(!options.integrity_header);
        assert_eq!(options.variant, QueryVariant::Compact);

        assert!(service.set_profile_field("p", "timeout", "0").is_err());
        assert!(service.set_profile_field("p", "variant", "huge").is_err());
    }

    #[test]
    fn test_set_columns() {
        let mut service = ConfigService::new(Config::default());
        service.set_profile_field("p", "columns", "iswc, akas").unwrap();
        assert_eq!(
            service.get_profile("p").unwrap().column_strategy(),
            ColumnStrategy::Declared(vec!["iswc".to_string(), "akas".to_string()])
        );

        service.set_profile_field("p", "columns", "union").unwrap();
        let profile = service.get_profile("p").unwrap();
        assert_eq!(profile.column_strategy(), ColumnStrategy::UnionOfAll);
        assert!(profile.declared_columns.is_none());

        assert!(service.set_profile_field("p", "columns", "declared").is_err());
        assert!(service.set_profile_field("p", "columns", " , ").is_err());
    }

    #[test]
    fn test_set_party_encodings() {
        let mut service = ConfigService::new(Config::default());
        service
            .set_profile_field("p", "writers-encoding", "keyword")
            .unwrap();
        service
            .set_profile_field("p", "performers-encoding", "plain")
            .unwrap();

        let encoding = service.get_profile("p").unwrap().party_encoding();
        assert_eq!(encoding.writers, PartyEncoding::Keyword);
        assert_eq!(encoding.publishers, PartyEncoding::Plain);
        assert_eq!(encoding.performers, PartyEncoding::Plain);

        assert!(
            service
                .set_profile_field("p", "writers-encoding", "fancy")
                .is_err()
        );
    }

    #[test]
    fn test_set_unknown_field() {
        let mut service = ConfigService::new(Config::default());
        for field in ["url", "composers-encoding", "api_key"] {
            let result = service.set_profile_field("p", field, "x");
            assert!(matches!(
                result,
                Err(AppError::Config(ConfigError::UnknownField { .. }))
            ));
        }
    }

    #[test]
    fn test_every_settable_field_is_recognised() {
        let samples = [
            "https://example.test",
            "5",
            "true",
            "full",
            "union",
            "keyword",
            "keyword",
            "keyword",
        ];
        let mut service = ConfigService::new(Config::default());
        for (field, value) in SETTABLE_FIELDS.iter().zip(samples) {
            service.set_profile_field("p", field, value).unwrap();
        }
        assert_eq!(service.list_profiles().len(), 1);
    }

    #[test]
    fn test_save_config_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut service = ConfigService::new(Config::default());
        service.set_profile_field("p", "timeout", "9").unwrap();
        service.save_config(Some(path.clone())).unwrap();

        let reloaded = Config::load(Some(path)).unwrap();
        assert_eq!(reloaded.get_profile("p").unwrap().timeout_seconds, Some(9));
        assert_eq!(reloaded, *service.config());
    }
}
