//! Per-value formatting rules for result cells.
//!
//! Every function here is total: any [`FieldValue`], or a missing one, maps to
//! a string.

use crate::api::models::{FieldValue, Record};

pub const PUBLISHER_DETAILS_KEY: &str = "publishersWithDetails";
pub const DEFAULT_PREVIEW_LEN: usize = 3;
const PLACEHOLDER: &str = "-";

/// An inline marker appended to a publisher name when `flag` is truthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipBadge {
    pub flag: String,
    pub label: String,
}

impl MembershipBadge {
    pub fn new(flag: &str, label: &str) -> Self {
        Self {
            flag: flag.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFormatter {
    publisher_key: String,
    badges: Vec<MembershipBadge>,
    preview_len: usize,
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self {
            publisher_key: PUBLISHER_DETAILS_KEY.to_string(),
            badges: vec![
                MembershipBadge::new("isApraMember", "APRA"),
                MembershipBadge::new("isAmcosMember", "AMCOS"),
            ],
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl CellFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_len(mut self, preview_len: usize) -> Self {
        self.preview_len = preview_len;
        self
    }

    pub fn with_badges(mut self, badges: Vec<MembershipBadge>) -> Self {
        self.badges = badges;
        self
    }

    /// `value` is `None` when the record has no such key.
    pub fn format(&self, key: &str, value: Option<&FieldValue>) -> String {
        if key == self.publisher_key {
            return self.format_publishers(value);
        }

        let Some(value) = value else {
            return PLACEHOLDER.to_string();
        };

        match value {
            FieldValue::TextList(items) => self.preview(items),
            FieldValue::NestedList(records) => records
                .iter()
                .map(compact_json)
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::List(items) => items
                .iter()
                .map(|item| joined_element(item, ", "))
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Nested(record) => compact_json(record),
            FieldValue::Null => PLACEHOLDER.to_string(),
            FieldValue::Text(s) if s.is_empty() => PLACEHOLDER.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => number_text(n),
            FieldValue::Bool(b) => b.to_string(),
        }
    }

    fn preview(&self, items: &[String]) -> String {
        if items.len() > self.preview_len {
            format!(
                "{} and {} more",
                items[..self.preview_len].join(", "),
                items.len() - self.preview_len
            )
        } else {
            items.join(", ")
        }
    }

    fn format_publishers(&self, value: Option<&FieldValue>) -> String {
        let lines: Vec<String> = match value {
            Some(FieldValue::NestedList(records)) => {
                records.iter().map(|r| self.publisher_line(Some(r))).collect()
            }
            Some(FieldValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    FieldValue::Nested(record) => self.publisher_line(Some(record)),
                    _ => self.publisher_line(None),
                })
                .collect(),
            Some(FieldValue::TextList(items)) => {
                items.iter().map(|_| self.publisher_line(None)).collect()
            }
            _ => Vec::new(),
        };

        if lines.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            lines.join("\n")
        }
    }

    fn publisher_line(&self, publisher: Option<&Record>) -> String {
        let mut line = match publisher.and_then(|p| p.get("name")).filter(|v| is_truthy(v)) {
            Some(FieldValue::Text(name)) => name.clone(),
            Some(other) => joined_element(other, ","),
            None => PLACEHOLDER.to_string(),
        };

        for badge in &self.badges {
            if publisher
                .and_then(|p| p.get(&badge.flag))
                .is_some_and(is_truthy)
            {
                line.push_str(&format!(" ({})", badge.label));
            }
        }
        line
    }
}

/// Formats with the default rules.
pub fn format_cell(key: &str, value: Option<&FieldValue>) -> String {
    CellFormatter::default().format(key, value)
}

/// Integral floats print without a fraction (`1.0` shows as `1`), up to the
/// point where exponent notation takes over.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

fn compact_json(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| PLACEHOLDER.to_string())
}

/// String form of a list element. Nulls become empty and nested lists are
/// joined with `separator`.
fn joined_element(value: &FieldValue, separator: &str) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => number_text(n),
        FieldValue::Text(s) => s.clone(),
        FieldValue::TextList(items) => items.join(","),
        FieldValue::Nested(record) => compact_json(record),
        FieldValue::NestedList(records) => records
            .iter()
            .map(compact_json)
            .collect::<Vec<_>>()
            .join(separator),
        FieldValue::List(items) => items
            .iter()
            .map(|item| joined_element(item, ","))
            .collect::<Vec<_>>()
            .join(","),
    }
}

fn is_truthy(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => false,
        FieldValue::Bool(b) => *b,
        FieldValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        FieldValue::Text(s) => !s.is_empty(),
        _ => true,
    }
}
