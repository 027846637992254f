//! Column set derivation for result tables.

use crate::api::models::Record;
use serde::{Deserialize, Serialize};

/// Where the non-leading columns come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnStrategy {
    /// Keys of the first record, in its order. Assumes every record has the same keys.
    #[default]
    FirstRecord,
    /// Keys of every record, in first-seen order.
    UnionOfAll,
    /// An explicit list, independent of what came back.
    Declared(Vec<String>),
}

/// Config-file spelling of [`ColumnStrategy`] without its payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnStrategyKind {
    #[default]
    FirstRecord,
    Union,
    Declared,
}

impl ColumnStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnStrategyKind::FirstRecord => "first-record",
            ColumnStrategyKind::Union => "union",
            ColumnStrategyKind::Declared => "declared",
        }
    }
}

impl std::str::FromStr for ColumnStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-record" | "first" => Ok(ColumnStrategyKind::FirstRecord),
            "union" => Ok(ColumnStrategyKind::Union),
            "declared" => Ok(ColumnStrategyKind::Declared),
            other => Err(format!(
                "unknown column strategy '{}', expected first-record, union or declared",
                other
            )),
        }
    }
}

impl ColumnStrategy {
    pub fn from_kind(kind: ColumnStrategyKind, declared: Option<&[String]>) -> Self {
        match kind {
            ColumnStrategyKind::FirstRecord => ColumnStrategy::FirstRecord,
            ColumnStrategyKind::Union => ColumnStrategy::UnionOfAll,
            ColumnStrategyKind::Declared => {
                ColumnStrategy::Declared(declared.map(<[String]>::to_vec).unwrap_or_default())
            }
        }
    }
}

/// Leading columns followed by the strategy's columns, without duplicates.
///
/// With an empty record list only the leading columns come back, except for
/// [`ColumnStrategy::Declared`] whose list does not depend on the records.
pub fn infer_columns(records: &[Record], leading: &[&str], strategy: &ColumnStrategy) -> Vec<String> {
    let mut columns: Vec<String> = leading.iter().map(|c| c.to_string()).collect();

    let mut push = |key: &str| {
        if !columns.iter().any(|c| c == key) {
            columns.push(key.to_string());
        }
    };

    match strategy {
        ColumnStrategy::FirstRecord => {
            if let Some(first) = records.first() {
                first.keys().for_each(&mut push);
            }
        }
        ColumnStrategy::UnionOfAll => {
            for record in records {
                record.keys().for_each(&mut push);
            }
        }
        ColumnStrategy::Declared(declared) => {
            declared.iter().map(String::as_str).for_each(&mut push);
        }
    }

    columns
}
