//! Form State Manager.
//!
//! [`QueryForm`] owns every value the user can edit. Scalars are coerced on
//! update and never validated; the three relational categories are kept as
//! independent row lists that always contain at least one (possibly empty)
//! row, so the editor can always show something to type into.
//!
//! The form is never pruned. [`QueryForm::build_payload`] derives a separate,
//! sanitized [`QueryPayload`] on every submission.

use crate::core::payload::{PartyEncodingConfig, QueryPayload, encode_entries, non_empty};
use crate::error::FormError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_TAKE: u64 = 20;

/// How the title text is matched against catalogue titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleMatchMode {
    #[default]
    StartsWith,
    Contains,
    Exact,
}

impl TitleMatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleMatchMode::StartsWith => "StartsWith",
            TitleMatchMode::Contains => "Contains",
            TitleMatchMode::Exact => "Exact",
        }
    }
}

impl fmt::Display for TitleMatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TitleMatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "startswith" => Ok(TitleMatchMode::StartsWith),
            "contains" => Ok(TitleMatchMode::Contains),
            "exact" => Ok(TitleMatchMode::Exact),
            _ => Err(format!(
                "unknown match mode '{}', expected StartsWith, Contains or Exact",
                s.trim()
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Title,
    TitleMatchMode,
    WorkId,
    Iswc,
    Ipi,
    CatalogueNumber,
    Skip,
    Take,
}

impl ScalarField {
    pub const ALL: [ScalarField; 8] = [
        ScalarField::Title,
        ScalarField::TitleMatchMode,
        ScalarField::WorkId,
        ScalarField::Iswc,
        ScalarField::Ipi,
        ScalarField::CatalogueNumber,
        ScalarField::Skip,
        ScalarField::Take,
    ];

    /// Payload key for this field.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarField::Title => "title",
            ScalarField::TitleMatchMode => "titleMatchMode",
            ScalarField::WorkId => "workId",
            ScalarField::Iswc => "iswc",
            ScalarField::Ipi => "ipi",
            ScalarField::CatalogueNumber => "catalogueNumber",
            ScalarField::Skip => "skip",
            ScalarField::Take => "take",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarField::Skip | ScalarField::Take)
    }
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        ScalarField::ALL
            .into_iter()
            .find(|field| normalize_name(field.name()) == wanted)
            .ok_or_else(|| FormError::UnknownField(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatableField {
    Writers,
    Publishers,
    Performers,
}

impl RepeatableField {
    pub const ALL: [RepeatableField; 3] = [
        RepeatableField::Writers,
        RepeatableField::Publishers,
        RepeatableField::Performers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RepeatableField::Writers => "writers",
            RepeatableField::Publishers => "publishers",
            RepeatableField::Performers => "performers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RepeatableField::Writers => "Writers",
            RepeatableField::Publishers => "Publishers",
            RepeatableField::Performers => "Performers",
        }
    }
}

impl fmt::Display for RepeatableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepeatableField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // singular forms are accepted too: "writer" -> writers
        let wanted = normalize_name(s);
        let wanted = wanted.trim_end_matches('s');
        RepeatableField::ALL
            .into_iter()
            .find(|field| field.name().trim_end_matches('s') == wanted)
            .ok_or_else(|| FormError::UnknownGroup(s.trim().to_string()))
    }
}

/// Lowercase with `-`, `_` and spaces removed, so `work-id`, `work_id` and `workId` agree.
fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Browser-style numeric coercion. Empty input is zero; input that is not a
/// finite, non-negative number yields `None`.
fn coerce_count(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Some(n.trunc() as u64),
        _ => None,
    }
}

/// In-memory query form model.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryForm {
    title: String,
    title_match_mode: TitleMatchMode,
    work_id: String,
    iswc: String,
    ipi: String,
    catalogue_number: String,
    skip: Option<u64>,
    take: Option<u64>,
    writers: Vec<String>,
    publishers: Vec<String>,
    performers: Vec<String>,
}

impl Default for QueryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryForm {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            title_match_mode: TitleMatchMode::default(),
            work_id: String::new(),
            iswc: String::new(),
            ipi: String::new(),
            catalogue_number: String::new(),
            skip: Some(DEFAULT_SKIP),
            take: Some(DEFAULT_TAKE),
            writers: vec![String::new()],
            publishers: vec![String::new()],
            performers: vec![String::new()],
        }
    }

    /// Stores a scalar, coercing numeric fields. Never fails.
    pub fn update_scalar(&mut self, field: ScalarField, raw_value: &str) {
        match field {
            ScalarField::Title => self.title = raw_value.to_string(),
            ScalarField::TitleMatchMode => {
                if let Ok(mode) = raw_value.parse() {
                    self.title_match_mode = mode;
                } else {
                    log::debug!("ignoring unknown title match mode '{}'", raw_value);
                }
            }
            ScalarField::WorkId => self.work_id = raw_value.to_string(),
            ScalarField::Iswc => self.iswc = raw_value.to_string(),
            ScalarField::Ipi => self.ipi = raw_value.to_string(),
            ScalarField::CatalogueNumber => self.catalogue_number = raw_value.to_string(),
            ScalarField::Skip => self.skip = coerce_count(raw_value),
            ScalarField::Take => self.take = coerce_count(raw_value),
        }
    }

    /// Current value of a scalar as the user would see it in the input box.
    pub fn scalar(&self, field: ScalarField) -> String {
        match field {
            ScalarField::Title => self.title.clone(),
            ScalarField::TitleMatchMode => self.title_match_mode.to_string(),
            ScalarField::WorkId => self.work_id.clone(),
            ScalarField::Iswc => self.iswc.clone(),
            ScalarField::Ipi => self.ipi.clone(),
            ScalarField::CatalogueNumber => self.catalogue_number.clone(),
            ScalarField::Skip => self.skip.map(|n| n.to_string()).unwrap_or_default(),
            ScalarField::Take => self.take.map(|n| n.to_string()).unwrap_or_default(),
        }
    }

    pub fn title_match_mode(&self) -> TitleMatchMode {
        self.title_match_mode
    }

    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn take(&self) -> Option<u64> {
        self.take
    }

    pub fn entries(&self, field: RepeatableField) -> &[String] {
        match field {
            RepeatableField::Writers => &self.writers,
            RepeatableField::Publishers => &self.publishers,
            RepeatableField::Performers => &self.performers,
        }
    }

    fn entries_mut(&mut self, field: RepeatableField) -> &mut Vec<String> {
        match field {
            RepeatableField::Writers => &mut self.writers,
            RepeatableField::Publishers => &mut self.publishers,
            RepeatableField::Performers => &mut self.performers,
        }
    }

    /// Replaces the row at `index` (0-based).
    pub fn update_repeatable_entry(
        &mut self,
        field: RepeatableField,
        index: usize,
        value: &str,
    ) -> Result<(), FormError> {
        let entries = self.entries_mut(field);
        let len = entries.len();
        let slot = entries
            .get_mut(index)
            .ok_or_else(|| FormError::IndexOutOfBounds {
                field: field.name().to_string(),
                index,
                len,
            })?;
        *slot = value.to_string();
        Ok(())
    }

    /// Appends an empty row and returns its index.
    pub fn add_repeatable_entry(&mut self, field: RepeatableField) -> usize {
        let entries = self.entries_mut(field);
        entries.push(String::new());
        entries.len() - 1
    }

    /// Whether [`Self::remove_repeatable_entry`] would be refused.
    pub fn can_remove(&self, field: RepeatableField) -> bool {
        self.entries(field).len() > 1
    }

    /// Removes the row at `index` (0-based). The last remaining row is never removed.
    pub fn remove_repeatable_entry(
        &mut self,
        field: RepeatableField,
        index: usize,
    ) -> Result<String, FormError> {
        let entries = self.entries_mut(field);
        let len = entries.len();
        if index >= len {
            return Err(FormError::IndexOutOfBounds {
                field: field.name().to_string(),
                index,
                len,
            });
        }
        if len == 1 {
            return Err(FormError::LastEntry {
                field: field.name().to_string(),
            });
        }
        Ok(entries.remove(index))
    }

    /// Derives the sanitized payload. Does not modify the form.
    pub fn build_payload(&self, encoding: &PartyEncodingConfig) -> QueryPayload {
        QueryPayload {
            title: non_empty(&self.title),
            title_match_mode: Some(self.title_match_mode),
            work_id: non_empty(&self.work_id),
            iswc: non_empty(&self.iswc),
            ipi: non_empty(&self.ipi),
            catalogue_number: non_empty(&self.catalogue_number),
            writers: encode_entries(&self.writers, encoding.writers),
            publishers: encode_entries(&self.publishers, encoding.publishers),
            performers: encode_entries(&self.performers, encoding.performers),
            skip: self.skip,
            take: self.take,
        }
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
