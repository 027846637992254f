//! Line-oriented form editor.
//!
//! Shows the form with every relational group as numbered rows, reads one
//! command per line, and submits through [`SearchService`]. Rows are numbered
//! from 1 on screen and converted to 0-based indices before they reach the form.

use crate::cli::command_handlers::ResultPresenter;
use crate::core::form::{QueryForm, RepeatableField, ScalarField};
use crate::core::services::search_service::SearchService;
use crate::core::services::traits::SearchGateway;
use crate::core::session::SubmitOutcome;
use crate::display::progress::ProgressSpinner;
use crate::error::{AppError, CliError, DisplayError, FormError};
use crate::utils::error_helpers::convert_serialize_error;
use crate::utils::text::{label_width, pad_to_width, truncate_to_width};
use std::io::{BufRead, Write};

const PROMPT: &str = "form> ";
const EMPTY_ROW: &str = "(empty)";
const MAX_VALUE_WIDTH: usize = 60;

const HELP: &str = "\
Commands:
  set <field> <value>          set title, titleMatchMode, workId, iswc, ipi,
                               catalogueNumber, skip or take
  edit <group> <row> <value>   replace a writers/publishers/performers row
  add <group>                  append an empty row
  remove <group> <row>         remove a row (the last row stays)
  show                         print the form
  payload                      print the payload a search would send
  search                       submit the form
  reset                        clear the form
  help                         this text
  quit                         leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Set { field: ScalarField, value: String },
    Edit {
        group: RepeatableField,
        row: usize,
        value: String,
    },
    Add(RepeatableField),
    Remove { group: RepeatableField, row: usize },
    Show,
    Payload,
    Search,
    Reset,
    Help,
    Quit,
}

impl FormCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, AppError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let command = match verb.to_ascii_lowercase().as_str() {
            "set" => {
                let (field, value) = split_word(rest);
                FormCommand::Set {
                    field: required(field, "set <field> <value>")?.parse()?,
                    value: value.to_string(),
                }
            }
            "edit" => {
                let (group, rest) = split_word(rest);
                let (row, value) = split_word(rest);
                FormCommand::Edit {
                    group: required(group, "edit <group> <row> <value>")?.parse()?,
                    row: parse_row(row)?,
                    value: value.to_string(),
                }
            }
            "add" => FormCommand::Add(required(rest, "add <group>")?.parse()?),
            "remove" | "rm" => {
                let (group, row) = split_word(rest);
                FormCommand::Remove {
                    group: required(group, "remove <group> <row>")?.parse()?,
                    row: parse_row(row)?,
                }
            }
            "show" => FormCommand::Show,
            "payload" => FormCommand::Payload,
            "search" | "submit" => FormCommand::Search,
            "reset" => FormCommand::Reset,
            "help" | "?" => FormCommand::Help,
            "quit" | "exit" | "q" => FormCommand::Quit,
            other => {
                return Err(CliError::InvalidArguments(format!(
                    "Unknown command '{}'. Type 'help' for the list",
                    other
                ))
                .into());
            }
        };
        Ok(Some(command))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn required<'a>(word: &'a str, usage: &str) -> Result<&'a str, AppError> {
    if word.is_empty() {
        Err(CliError::InvalidArguments(format!("Usage: {}", usage)).into())
    } else {
        Ok(word)
    }
}

fn parse_row(word: &str) -> Result<usize, AppError> {
    match word.trim().parse::<usize>() {
        Ok(row) if row >= 1 => Ok(row),
        _ => Err(CliError::InvalidArguments(format!(
            "'{}' is not a row number (rows start at 1)",
            word
        ))
        .into()),
    }
}

/// Reports out-of-range rows in the 1-based numbering the user typed.
fn one_based(error: FormError) -> FormError {
    match error {
        FormError::IndexOutOfBounds { field, index, len } => FormError::IndexOutOfBounds {
            field,
            index: index + 1,
            len,
        },
        other => other,
    }
}

pub struct FormEditor<R, W, G> {
    input: R,
    output: W,
    form: QueryForm,
    service: SearchService<G>,
    presenter: ResultPresenter,
    show_spinner: bool,
}

impl<R, W, G> FormEditor<R, W, G>
where
    R: BufRead,
    W: Write,
    G: SearchGateway,
{
    pub fn new(input: R, output: W, service: SearchService<G>, presenter: ResultPresenter) -> Self {
        Self {
            input,
            output,
            form: QueryForm::new(),
            service,
            presenter,
            show_spinner: false,
        }
    }

    pub fn with_spinner(mut self, show_spinner: bool) -> Self {
        self.show_spinner = show_spinner;
        self
    }

    pub fn form(&self) -> &QueryForm {
        &self.form
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Reads commands until `quit` or end of input. Command errors are printed
    /// and the loop continues; only I/O failures end it early.
    pub async fn run(&mut self) -> Result<(), AppError> {
        self.write_line("Work search form. Type 'help' for commands.")?;
        self.write_form()?;

        let mut line = String::new();
        loop {
            write!(self.output, "{}", PROMPT).map_err(output_error)?;
            self.output.flush().map_err(output_error)?;

            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| CliError::InvalidArguments(format!("cannot read input: {}", e)))?;
            if read == 0 {
                self.write_line("")?;
                break;
            }

            let command = match FormCommand::parse(&line) {
                Ok(Some(FormCommand::Quit)) => break,
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    self.write_line(&format!("Error: {}", e.user_message()))?;
                    continue;
                }
            };

            if let Err(e) = self.execute(command).await {
                if matches!(e, AppError::Display(DisplayError::TerminalOutput(_))) {
                    return Err(e);
                }
                self.write_line(&format!("Error: {}", e.user_message()))?;
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: FormCommand) -> Result<(), AppError> {
        match command {
            FormCommand::Set { field, value } => {
                self.form.update_scalar(field, &value);
                let stored = self.form.scalar(field);
                self.write_line(&format!("{} = {}", field, display_value(&stored)))
            }
            FormCommand::Edit { group, row, value } => {
                self.form
                    .update_repeatable_entry(group, row - 1, &value)
                    .map_err(one_based)?;
                self.write_line(&format!("{} row {} = {}", group, row, display_value(&value)))
            }
            FormCommand::Add(group) => {
                let index = self.form.add_repeatable_entry(group);
                self.write_line(&format!("Added {} row {}", group, index + 1))
            }
            FormCommand::Remove { group, row } => {
                let removed = self
                    .form
                    .remove_repeatable_entry(group, row - 1)
                    .map_err(one_based)?;
                self.write_line(&format!(
                    "Removed {} row {} ({})",
                    group,
                    row,
                    display_value(&removed)
                ))
            }
            FormCommand::Show => self.write_form(),
            FormCommand::Payload => {
                let payload = self.service.payload_for(&self.form);
                let json = serde_json::to_string_pretty(&payload)
                    .map_err(|e| AppError::Display(convert_serialize_error(e, "payload")))?;
                self.write_line(&json)
            }
            FormCommand::Search => self.search().await,
            FormCommand::Reset => {
                self.form.reset();
                self.write_line("Form cleared.")
            }
            FormCommand::Help => self.write_line(HELP),
            FormCommand::Quit => Ok(()),
        }
    }

    async fn search(&mut self) -> Result<(), AppError> {
        let mut spinner = ProgressSpinner::searching();
        if self.show_spinner {
            spinner.start();
        }
        let outcome = self.service.submit(&self.form).await;
        spinner.stop();

        if outcome == SubmitOutcome::Superseded {
            return Ok(());
        }

        let rendered = {
            let session = self.service.session();
            if let Some(error) = session.error() {
                return Err(CliError::SearchFailed(error.to_string()).into());
            }
            match session.result() {
                Some(result) => self.presenter.render(result, self.form.skip().unwrap_or(0))?,
                None => return Ok(()),
            }
        };
        self.write_line(&rendered)
    }

    fn write_form(&mut self) -> Result<(), AppError> {
        let width = label_width(ScalarField::ALL.iter().map(|f| f.name()));
        let mut text = String::new();

        for field in ScalarField::ALL {
            let value = self.form.scalar(field);
            text.push_str(&format!(
                "  {} : {}\n",
                pad_to_width(field.name(), width),
                display_value(&value)
            ));
        }

        for group in RepeatableField::ALL {
            text.push_str(&format!("{}\n", group.label()));
            for (i, entry) in self.form.entries(group).iter().enumerate() {
                text.push_str(&format!("  {}. {}\n", i + 1, display_value(entry)));
            }
        }

        self.write_line(text.trim_end())
    }

    fn write_line(&mut self, text: &str) -> Result<(), AppError> {
        writeln!(self.output, "{}", text).map_err(output_error)
    }
}

fn display_value(value: &str) -> String {
    if value.is_empty() {
        EMPTY_ROW.to_string()
    } else {
        truncate_to_width(value, MAX_VALUE_WIDTH)
    }
}

fn output_error(e: std::io::Error) -> AppError {
    AppError::Display(DisplayError::TerminalOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::SearchResult;
    use crate::api::query::QueryVariant;
    use crate::core::payload::{PartyEncodingConfig, QueryPayload};
    use crate::display::columns::ColumnStrategy;
    use crate::display::table::{OutputFormat, TableDisplay};
    use crate::error::ApiError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedGateway {
        seen: Mutex<Vec<QueryPayload>>,
    }

    #[async_trait]
    impl SearchGateway for ScriptedGateway {
        async fn search(&self, payload: &QueryPayload) -> Result<SearchResult, ApiError> {
            self.seen.lock().unwrap().push(payload.clone());
            if payload.iswc.is_some() {
                return Err(ApiError::Gateway {
                    message: Some("Invalid ISWC".to_string()),
                    dropped: 0,
                });
            }
            Ok(serde_json::from_value(json!({
                "total": 1,
                "works": [{
                    "winfkey": "W1",
                    "title": "Yesterday",
                    "writers": ["A", "B", "C", "D", "E"],
                    "performers": ["The Beatles"]
                }]
            }))
            .unwrap())
        }
    }

    fn presenter() -> ResultPresenter {
        ResultPresenter::new(
            TableDisplay::new().with_max_width(160).with_colors(false),
            QueryVariant::Full,
            ColumnStrategy::FirstRecord,
            OutputFormat::Table,
        )
    }

    async fn run_script(script: &str, gateway: &ScriptedGateway) -> (String, QueryForm) {
        let service = SearchService::new(gateway, PartyEncodingConfig::default());
        let mut editor = FormEditor::new(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            service,
            presenter(),
        );
        editor.run().await.unwrap();
        let form = editor.form().clone();
        let output = String::from_utf8(editor.into_output()).unwrap();
        (output, form)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(FormCommand::parse("   ").unwrap(), None);
        assert_eq!(
            FormCommand::parse("set title Let It Be").unwrap(),
            Some(FormCommand::Set {
                field: ScalarField::Title,
                value: "Let It Be".to_string()
            })
        );
        assert_eq!(
            FormCommand::parse("edit writer 2 Paul McCartney").unwrap(),
            Some(FormCommand::Edit {
                group: RepeatableField::Writers,
                row: 2,
                value: "Paul McCartney".to_string()
            })
        );
        assert_eq!(
            FormCommand::parse("ADD performers").unwrap(),
            Some(FormCommand::Add(RepeatableField::Performers))
        );
        assert_eq!(
            FormCommand::parse("rm publishers 1").unwrap(),
            Some(FormCommand::Remove {
                group: RepeatableField::Publishers,
                row: 1
            })
        );
        assert_eq!(
            FormCommand::parse("set work-id").unwrap(),
            Some(FormCommand::Set {
                field: ScalarField::WorkId,
                value: String::new()
            })
        );
        assert_eq!(FormCommand::parse("q").unwrap(), Some(FormCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            FormCommand::parse("fly away"),
            Err(AppError::Cli(CliError::InvalidArguments(_)))
        ));
        assert!(matches!(
            FormCommand::parse("set colour red"),
            Err(AppError::Form(FormError::UnknownField(_)))
        ));
        assert!(matches!(
            FormCommand::parse("add composers"),
            Err(AppError::Form(FormError::UnknownGroup(_)))
        ));
        assert!(FormCommand::parse("edit writers 0 x").is_err());
        assert!(FormCommand::parse("remove writers").is_err());
        assert!(FormCommand::parse("set").is_err());
    }

    #[tokio::test]
    async fn test_editing_rows_keeps_other_rows() {
        let gateway = ScriptedGateway::default();
        let script = "\
edit writers 1 Lennon
add writers
edit writers 2 McCartney
add writers
edit writers 3 Harrison
remove writers 2
quit
";
        let (output, form) = run_script(script, &gateway).await;

        assert_eq!(
            form.entries(RepeatableField::Writers),
            ["Lennon".to_string(), "Harrison".to_string()]
        );
        assert!(output.contains("Added writers row 2"));
        assert!(output.contains("Removed writers row 2 (McCartney)"));
    }

    #[tokio::test]
    async fn test_errors_are_reported_and_loop_continues() {
        let gateway = ScriptedGateway::default();
        let script = "\
remove performers 1
edit performers 3 X
dance
set title Yesterday
";
        let (output, form) = run_script(script, &gateway).await;

        assert!(output.contains("Error: Cannot remove the last row of performers"));
        assert!(output.contains("Row 3 is out of range for performers (1 rows)"));
        assert!(output.contains("Unknown command 'dance'"));
        assert_eq!(form.scalar(ScalarField::Title), "Yesterday");
        assert_eq!(form.entries(RepeatableField::Performers).len(), 1);
    }

    #[tokio::test]
    async fn test_search_renders_table() {
        let gateway = ScriptedGateway::default();
        let script = "set title Yesterday\nedit writers 1 Lennon\nsearch\nquit\n";
        let (output, _) = run_script(script, &gateway).await;

        assert!(output.contains("Total: 1"));
        assert!(output.contains("A, B, C and 2 more"));

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let payload = serde_json::to_value(&seen[0]).unwrap();
        assert_eq!(payload["title"], "Yesterday");
        assert_eq!(payload["writers"], json!(["Lennon"]));
        assert!(payload.get("publishers").is_none());
        assert_eq!(payload["skip"], 0);
        assert_eq!(payload["take"], 20);
    }

    #[tokio::test]
    async fn test_search_error_is_shown_verbatim() {
        let gateway = ScriptedGateway::default();
        let (output, _) = run_script("set iswc T-1\nsearch\n", &gateway).await;

        assert!(output.contains("Error: Invalid ISWC\n"));
        assert!(!output.contains("Total:"));
    }

    #[tokio::test]
    async fn test_payload_and_show_and_reset() {
        let gateway = ScriptedGateway::default();
        let script = "set skip abc\npayload\nadd publishers\nreset\nshow\n";
        let (output, form) = run_script(script, &gateway).await;

        assert!(output.contains("skip = (empty)"));
        assert!(!output.contains("\"skip\""));
        assert!(output.contains("\"take\": 20"));
        assert!(output.contains("Form cleared."));
        assert!(output.contains("Publishers\n  1. (empty)"));
        assert_eq!(form, QueryForm::new());
        assert!(gateway.seen.lock().unwrap().is_empty());
    }
}
