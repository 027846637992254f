use crate::api::models::{Record, SearchResult};
use crate::display::cell::CellFormatter;
use crate::error::{AppError, DisplayError};
use crate::utils::error_helpers::convert_serialize_error;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;
use std::fmt;
use std::str::FromStr;

pub const NO_RESULTS_MESSAGE: &str = "No works matched.";

const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 240;
const FALLBACK_WIDTH: usize = 120;

/// How a search result is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Schema-inferred table
    Table,
    /// Pretty JSON of the record list
    Raw,
    /// Pretty JSON of the whole result
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Raw => "raw",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "raw" => Ok(OutputFormat::Raw),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Renders search results as tables or JSON dumps.
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
    formatter: CellFormatter,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: Self::colors_supported(),
            formatter: CellFormatter::default(),
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => Some((cols as usize).clamp(MIN_WIDTH, MAX_WIDTH)),
            Err(_) => None,
        }
    }

    /// Colors stay off under `NO_COLOR` or when stdout is redirected.
    pub fn colors_supported() -> bool {
        std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout)
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_formatter(mut self, formatter: CellFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Summary lines followed by the table in `columns` order.
    ///
    /// `skip` is the offset the request was made with; it only affects the
    /// `Showing a-b of n` line.
    pub fn render_search_result(
        &self,
        result: &SearchResult,
        columns: &[String],
        skip: u64,
    ) -> Result<String, AppError> {
        let mut output = self.render_summary(result, skip);

        if columns.is_empty() {
            output.push_str(NO_RESULTS_MESSAGE);
            return Ok(output);
        }

        let table = self.build_table(&result.records, columns);
        output.push_str(&table.to_string());

        if result.records.is_empty() {
            output.push('\n');
            output.push_str(NO_RESULTS_MESSAGE);
        }

        Ok(output)
    }

    pub fn render_summary(&self, result: &SearchResult, skip: u64) -> String {
        let mut summary = format!("Total: {}\n", result.total);
        let shown = result.records.len() as u64;
        if shown > 0 && shown < result.total {
            summary.push_str(&format!(
                "Showing {}-{} of {}\n",
                skip.saturating_add(1),
                skip.saturating_add(shown),
                result.total
            ));
        }
        summary
    }

    pub fn render_raw(&self, records: &[Record]) -> Result<String, AppError> {
        serde_json::to_string_pretty(records)
            .map_err(|e| AppError::Display(convert_serialize_error(e, "record list")))
    }

    pub fn render_json(&self, result: &SearchResult) -> Result<String, AppError> {
        serde_json::to_string_pretty(result)
            .map_err(|e| AppError::Display(convert_serialize_error(e, "search result")))
    }

    pub fn render(
        &self,
        format: OutputFormat,
        result: &SearchResult,
        columns: &[String],
        skip: u64,
    ) -> Result<String, AppError> {
        match format {
            OutputFormat::Table => self.render_search_result(result, columns, skip),
            OutputFormat::Raw => {
                let mut output = self.render_summary(result, skip);
                output.push_str(&self.render_raw(&result.records)?);
                Ok(output)
            }
            OutputFormat::Json => self.render_json(result),
        }
    }

    fn build_table(&self, records: &[Record], columns: &[String]) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_width(self.max_width.unwrap_or(FALLBACK_WIDTH) as u16);

        let headers: Vec<Cell> = columns
            .iter()
            .map(|column| {
                if self.use_colors {
                    Cell::new(column)
                        .add_attribute(Attribute::Bold)
                        .fg(Color::Cyan)
                } else {
                    Cell::new(column)
                }
            })
            .collect();
        table.set_header(headers);

        for record in records {
            let row: Vec<Cell> = columns
                .iter()
                .map(|column| {
                    let value = record.get(column);
                    let text = self.formatter.format(column, value);
                    if self.use_colors && value.is_none_or(|v| v.is_null()) {
                        Cell::new(text).fg(Color::DarkGrey)
                    } else {
                        Cell::new(text)
                    }
                })
                .collect();
            table.add_row(row);
        }

        table
    }

    /// Writes to stdout, mapping a closed pipe into a display error.
    pub fn print(&self, rendered: &str) -> Result<(), AppError> {
        use std::io::Write;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered)
            .map_err(|e| AppError::Display(DisplayError::TerminalOutput(e.to_string())))
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::FieldValue;
    use crate::api::query::LEADING_COLUMNS;
    use crate::display::columns::{ColumnStrategy, infer_columns};
    use serde_json::json;

    fn display() -> TableDisplay {
        TableDisplay::new().with_max_width(200).with_colors(false)
    }

    fn sample_result() -> SearchResult {
        serde_json::from_value(json!({
            "total": 57,
            "works": [
                {
                    "winfkey": "W1",
                    "title": "Yesterday",
                    "writers": ["A", "B", "C", "D", "E"],
                    "performers": [],
                    "iswc": null,
                    "publishersWithDetails": [
                        { "name": "Acme Music", "isApraMember": true, "isAmcosMember": false }
                    ]
                },
                {
                    "winfkey": "W2",
                    "title": "Let It Be",
                    "writers": ["Lennon"],
                    "performers": ["The Beatles"],
                    "iswc": "T-010.140.236-1",
                    "publishersWithDetails": []
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_table_display_builder() {
        let display = TableDisplay::new().with_max_width(80).with_colors(false);
        assert_eq!(display.max_width, Some(80));
        assert!(!display.use_colors);
    }

    #[test]
    fn test_render_search_result_table() {
        let result = sample_result();
        let columns = infer_columns(&result.records, &LEADING_COLUMNS, &ColumnStrategy::default());
        let rendered = display()
            .render_search_result(&result, &columns, 20)
            .unwrap();

        assert!(rendered.starts_with("Total: 57\n"));
        assert!(rendered.contains("Showing 21-22 of 57"));
        assert!(rendered.contains("publishersWithDetails"));
        assert!(rendered.contains("A, B, C and 2 more"));
        assert!(rendered.contains("Acme Music (APRA)"));
        assert!(rendered.contains("T-010.140.236-1"));
        assert!(!rendered.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_render_empty_result_shows_headers() {
        let result = SearchResult {
            total: 0,
            records: Vec::new(),
        };
        let columns = infer_columns(&result.records, &LEADING_COLUMNS, &ColumnStrategy::default());
        let rendered = display().render_search_result(&result, &columns, 0).unwrap();

        assert!(rendered.starts_with("Total: 0\n"));
        assert!(!rendered.contains("Showing"));
        assert!(rendered.contains("winfkey"));
        assert!(rendered.contains("performers"));
        assert!(rendered.ends_with(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_summary_omits_range_when_everything_shown() {
        let mut result = sample_result();
        result.total = 2;
        assert_eq!(display().render_summary(&result, 0), "Total: 2\n");
    }

    #[test]
    fn test_summary_range_saturates_at_huge_skip() {
        let result: SearchResult = serde_json::from_value(json!({
            "total": 5,
            "works": [{ "title": "x" }]
        }))
        .unwrap();
        let summary = display().render_summary(&result, u64::MAX);
        assert_eq!(
            summary,
            format!("Total: 5\nShowing {}-{} of 5\n", u64::MAX, u64::MAX)
        );
    }

    #[test]
    fn test_render_raw_and_json() {
        let result = sample_result();
        let display = display();

        let raw = display.render_raw(&result.records).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["title"], "Yesterday");
        assert!(raw.find("winfkey").unwrap() < raw.find("title").unwrap());

        let full = display.render_json(&result).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&full).unwrap();
        assert_eq!(parsed["total"], 57);
        assert_eq!(parsed["works"][1]["writers"], json!(["Lennon"]));
    }

    #[test]
    fn test_render_dispatch() {
        let result = sample_result();
        let columns = vec!["title".to_string()];
        let display = display();

        let raw = display.render(OutputFormat::Raw, &result, &columns, 0).unwrap();
        assert!(raw.starts_with("Total: 57\n"));
        assert!(raw.contains("\"winfkey\": \"W1\""));

        let json = display.render(OutputFormat::Json, &result, &columns, 0).unwrap();
        assert!(json.trim_start().starts_with('{'));
    }

    #[test]
    fn test_missing_key_renders_placeholder() {
        let mut record = Record::new();
        record.insert("title", FieldValue::Text("Solo".to_string()));
        let result = SearchResult {
            total: 1,
            records: vec![record],
        };
        let columns = vec!["title".to_string(), "iswc".to_string()];
        let rendered = display().render_search_result(&result, &columns, 0).unwrap();
        assert!(rendered.contains("Solo"));
        assert!(rendered.contains(" - "));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("TABLE".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("raw".parse::<OutputFormat>(), Ok(OutputFormat::Raw));
        assert!("csv".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
