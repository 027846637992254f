//! Sanitized query payload sent as the `workSearchInput` variable.

use crate::core::form::{RepeatableField, TitleMatchMode};
use serde::{Deserialize, Serialize};

/// How entries of one relational category are sent to the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyEncoding {
    /// `"Lennon"`
    #[default]
    Plain,
    /// `{ "nameKeyword": "Lennon" }`
    Keyword,
}

impl std::str::FromStr for PartyEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(PartyEncoding::Plain),
            "keyword" => Ok(PartyEncoding::Keyword),
            other => Err(format!(
                "unknown party encoding '{}', expected 'plain' or 'keyword'",
                other
            )),
        }
    }
}

impl std::fmt::Display for PartyEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PartyEncoding::Plain => "plain",
            PartyEncoding::Keyword => "keyword",
        })
    }
}

/// Per-category choice of [`PartyEncoding`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyEncodingConfig {
    pub writers: PartyEncoding,
    pub publishers: PartyEncoding,
    pub performers: PartyEncoding,
}

impl PartyEncodingConfig {
    /// Same encoding for every category.
    pub fn uniform(encoding: PartyEncoding) -> Self {
        Self {
            writers: encoding,
            publishers: encoding,
            performers: encoding,
        }
    }

    pub fn for_field(&self, field: RepeatableField) -> PartyEncoding {
        match field {
            RepeatableField::Writers => self.writers,
            RepeatableField::Publishers => self.publishers,
            RepeatableField::Performers => self.performers,
        }
    }

    pub fn set(&mut self, field: RepeatableField, encoding: PartyEncoding) {
        match field {
            RepeatableField::Writers => self.writers = encoding,
            RepeatableField::Publishers => self.publishers = encoding,
            RepeatableField::Performers => self.performers = encoding,
        }
    }
}

/// One non-empty repeatable entry as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartyEntry {
    Plain(String),
    Keyword {
        #[serde(rename = "nameKeyword")]
        name_keyword: String,
    },
}

impl PartyEntry {
    pub fn encode(value: &str, encoding: PartyEncoding) -> Self {
        match encoding {
            PartyEncoding::Plain => PartyEntry::Plain(value.to_string()),
            PartyEncoding::Keyword => PartyEntry::Keyword {
                name_keyword: value.to_string(),
            },
        }
    }

    pub fn value(&self) -> &str {
        match self {
            PartyEntry::Plain(value) => value,
            PartyEntry::Keyword { name_keyword } => name_keyword,
        }
    }
}

/// Write-once snapshot of the form, with empty scalars and empty lists omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_match_mode: Option<TitleMatchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iswc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogue_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writers: Option<Vec<PartyEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishers: Option<Vec<PartyEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performers: Option<Vec<PartyEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
}

impl QueryPayload {
    pub fn party(&self, field: RepeatableField) -> Option<&[PartyEntry]> {
        match field {
            RepeatableField::Writers => self.writers.as_deref(),
            RepeatableField::Publishers => self.publishers.as_deref(),
            RepeatableField::Performers => self.performers.as_deref(),
        }
    }
}

/// `Some(value)` unless the value is the empty string.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Drops empty entries, encodes the rest, and yields `None` when nothing is left.
pub(crate) fn encode_entries(entries: &[String], encoding: PartyEncoding) -> Option<Vec<PartyEntry>> {
    let encoded: Vec<PartyEntry> = entries
        .iter()
        .filter(|entry| !entry.is_empty())
        .map(|entry| PartyEntry::encode(entry, encoding))
        .collect();

    if encoded.is_empty() { None } else { Some(encoded) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_party_entry_serialization() {
        let plain = PartyEntry::encode("Lennon", PartyEncoding::Plain);
        let keyword = PartyEntry::encode("Lennon", PartyEncoding::Keyword);

        assert_eq!(serde_json::to_value(&plain).unwrap(), json!("Lennon"));
        assert_eq!(
            serde_json::to_value(&keyword).unwrap(),
            json!({ "nameKeyword": "Lennon" })
        );
        assert_eq!(keyword.value(), "Lennon");
    }

    #[test]
    fn test_encode_entries_filters_empty() {
        let entries = vec![
            String::new(),
            "McCartney".to_string(),
            String::new(),
            " ".to_string(),
        ];
        let encoded = encode_entries(&entries, PartyEncoding::Plain).unwrap();
        assert_eq!(
            encoded,
            vec![
                PartyEntry::Plain("McCartney".to_string()),
                PartyEntry::Plain(" ".to_string()),
            ]
        );

        assert!(encode_entries(&[String::new()], PartyEncoding::Keyword).is_none());
        assert!(encode_entries(&[], PartyEncoding::Plain).is_none());
    }

    #[test]
    fn test_empty_payload_serializes_to_empty_object() {
        let payload = QueryPayload::default();
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({}));
    }

    #[test]
    fn test_payload_uses_camel_case_keys() {
        let payload = QueryPayload {
            work_id: Some("W1".to_string()),
            catalogue_number: Some("CAT-9".to_string()),
            title_match_mode: Some(TitleMatchMode::Exact),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "titleMatchMode": "Exact",
                "workId": "W1",
                "catalogueNumber": "CAT-9"
            })
        );
    }

    #[test]
    fn test_encoding_config_per_field() {
        let mut config = PartyEncodingConfig::default();
        assert_eq!(config.for_field(RepeatableField::Writers), PartyEncoding::Plain);

        config.set(RepeatableField::Publishers, PartyEncoding::Keyword);
        assert_eq!(
            config.for_field(RepeatableField::Publishers),
            PartyEncoding::Keyword
        );
        assert_eq!(
            config.for_field(RepeatableField::Performers),
            PartyEncoding::Plain
        );

        let uniform = PartyEncodingConfig::uniform(PartyEncoding::Keyword);
        assert_eq!(uniform.writers, PartyEncoding::Keyword);
        assert_eq!(uniform.performers, PartyEncoding::Keyword);
    }

    #[test]
    fn test_party_encoding_from_str() {
        assert_eq!("Keyword".parse::<PartyEncoding>(), Ok(PartyEncoding::Keyword));
        assert_eq!(" plain ".parse::<PartyEncoding>(), Ok(PartyEncoding::Plain));
        assert!("wrapped".parse::<PartyEncoding>().is_err());
    }
}
