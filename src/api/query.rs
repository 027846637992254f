//! GraphQL documents for the public work search.
//!
//! The renderer does not depend on which variant produced a result; the
//! variants only differ in the field selection and in whether the fixed
//! leading columns apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const OPERATION_NAME: &str = "WorkSearchPublic";
pub const ROOT_FIELD: &str = "workSearchPublic";
pub const INPUT_VARIABLE: &str = "workSearchInput";
pub const INPUT_TYPE: &str = "WorkSearchInputPublic!";

/// Fixed columns shown before the inferred ones.
pub const LEADING_COLUMNS: [&str; 4] = ["winfkey", "title", "writers", "performers"];

const COMPACT_SELECTION: &str = "winfkey title iswc";

const STANDARD_SELECTION: &str = "winfkey iswc title writers performers akas";

const FULL_SELECTION: &str = "winfkey
      iswc
      title
      writers
      performers
      exclWriter
      isDispute
      isPdof
      isNc
      isCisnetExclude
      isLocal
      workMessage
      amcosControl
      akas
      publishersWithDetails {
        wrthkey
        name
        isApraMember
        isAmcosMember
      }";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryVariant {
    Compact,
    Standard,
    #[default]
    Full,
}

impl QueryVariant {
    pub fn selection(&self) -> &'static str {
        match self {
            QueryVariant::Compact => COMPACT_SELECTION,
            QueryVariant::Standard => STANDARD_SELECTION,
            QueryVariant::Full => FULL_SELECTION,
        }
    }

    /// Complete query document for this variant.
    pub fn document(&self) -> String {
        format!(
            "query {op}(${var}: {ty}) {{
  {root}({var}: ${var}) {{
    total
    works {{
      {selection}
    }}
  }}
}}",
            op = OPERATION_NAME,
            var = INPUT_VARIABLE,
            ty = INPUT_TYPE,
            root = ROOT_FIELD,
            selection = self.selection(),
        )
    }

    pub fn leading_columns(&self) -> &'static [&'static str] {
        match self {
            QueryVariant::Compact => &[],
            QueryVariant::Standard | QueryVariant::Full => &LEADING_COLUMNS,
        }
    }

    /// Compact results are shown as a structural dump rather than a table.
    pub fn prefers_raw_output(&self) -> bool {
        matches!(self, QueryVariant::Compact)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryVariant::Compact => "compact",
            QueryVariant::Standard => "standard",
            QueryVariant::Full => "full",
        }
    }
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(QueryVariant::Compact),
            "standard" => Ok(QueryVariant::Standard),
            "full" => Ok(QueryVariant::Full),
            other => Err(format!(
                "unknown query variant '{}', expected compact, standard or full",
                other
            )),
        }
    }
}
