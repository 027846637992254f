use crate::api::client::{ClientOptions, WorkSearchClient, encode_request_body};
use crate::api::integrity::{CONTENT_SHA256_HEADER, content_sha256};
use crate::api::models::SearchResult;
use crate::api::query::QueryVariant;
use crate::cli::interactive::FormEditor;
use crate::cli::main_types::{ConfigCommands, RequestOptions, SearchArgs};
use crate::core::form::{QueryForm, RepeatableField, ScalarField, TitleMatchMode};
use crate::core::payload::{PartyEncoding, PartyEncodingConfig, QueryPayload};
use crate::core::services::config_service::{ConfigService, SETTABLE_FIELDS};
use crate::core::services::search_service::SearchService;
use crate::display::columns::{ColumnStrategy, infer_columns};
use crate::display::progress::ProgressSpinner;
use crate::display::table::{OutputFormat, TableDisplay};
use crate::error::{AppError, CliError};
use crate::storage::config::Profile;
use crate::utils::error_helpers::convert_serialize_error;
use crate::utils::logging::print_verbose;
use crate::utils::validation::validate_url;
use std::path::PathBuf;

/// Effective request and output settings: profile values overridden by flags.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub profile_name: String,
    pub endpoint: Option<String>,
    pub client_options: ClientOptions,
    pub encoding: PartyEncodingConfig,
    pub strategy: ColumnStrategy,
    pub format: OutputFormat,
}

impl SearchSettings {
    pub fn resolve(
        profile_name: &str,
        profile: Option<&Profile>,
        endpoint_override: Option<&str>,
        request: &RequestOptions,
    ) -> Self {
        let profile = profile.cloned().unwrap_or_default();

        let mut client_options = profile.client_options();
        if let Some(variant) = request.variant {
            client_options.variant = variant;
        }
        if let Some(timeout) = request.timeout.filter(|t| *t > 0) {
            client_options.timeout_secs = timeout;
        }
        if request.no_integrity_header {
            client_options.integrity_header = false;
        }

        let encoding = if request.keyword_parties {
            PartyEncodingConfig::uniform(PartyEncoding::Keyword)
        } else {
            profile.party_encoding()
        };

        let format = request.format.unwrap_or(if client_options.variant.prefers_raw_output() {
            OutputFormat::Raw
        } else {
            OutputFormat::Table
        });

        let endpoint = endpoint_override
            .map(str::to_string)
            .or_else(|| profile.endpoint.clone())
            .filter(|e| !e.trim().is_empty());

        Self {
            profile_name: profile_name.to_string(),
            endpoint,
            client_options,
            encoding,
            strategy: profile.column_strategy(),
            format,
        }
    }

    pub fn client(&self) -> Result<WorkSearchClient, AppError> {
        let endpoint = self
            .endpoint
            .clone()
            .ok_or_else(|| CliError::EndpointMissing {
                profile: self.profile_name.clone(),
            })?;
        validate_url(&endpoint)?;
        Ok(WorkSearchClient::new(endpoint, self.client_options)?)
    }

    pub fn presenter(&self) -> ResultPresenter {
        ResultPresenter::new(
            TableDisplay::new(),
            self.client_options.variant,
            self.strategy.clone(),
            self.format,
        )
    }
}

/// Turns a search result into printable text for one variant and format.
pub struct ResultPresenter {
    display: TableDisplay,
    variant: QueryVariant,
    strategy: ColumnStrategy,
    format: OutputFormat,
}

impl ResultPresenter {
    pub fn new(
        display: TableDisplay,
        variant: QueryVariant,
        strategy: ColumnStrategy,
        format: OutputFormat,
    ) -> Self {
        Self {
            display,
            variant,
            strategy,
            format,
        }
    }

    pub fn render(&self, result: &SearchResult, skip: u64) -> Result<String, AppError> {
        let columns = infer_columns(
            &result.records,
            self.variant.leading_columns(),
            &self.strategy,
        );
        self.display.render(self.format, result, &columns, skip)
    }

    pub fn print(&self, rendered: &str) -> Result<(), AppError> {
        self.display.print(rendered)
    }
}

/// Fills a form from `search` flags through the same operations the editor uses.
pub fn build_form(args: &SearchArgs) -> Result<QueryForm, AppError> {
    let mut form = QueryForm::new();

    let scalars = [
        (ScalarField::Title, &args.title),
        (ScalarField::WorkId, &args.work_id),
        (ScalarField::Iswc, &args.iswc),
        (ScalarField::Ipi, &args.ipi),
        (ScalarField::CatalogueNumber, &args.catalogue_number),
        (ScalarField::Skip, &args.skip),
        (ScalarField::Take, &args.take),
    ];
    for (field, value) in scalars {
        if let Some(value) = value {
            form.update_scalar(field, value);
            if field.is_numeric() && form.scalar(field).is_empty() {
                log::warn!(
                    "--{} '{}' is not a non-negative number and will not be sent",
                    field,
                    value
                );
            }
        }
    }

    if let Some(mode) = &args.match_mode {
        mode.parse::<TitleMatchMode>()
            .map_err(CliError::InvalidArguments)?;
        form.update_scalar(ScalarField::TitleMatchMode, mode);
    }

    let groups = [
        (RepeatableField::Writers, &args.writers),
        (RepeatableField::Publishers, &args.publishers),
        (RepeatableField::Performers, &args.performers),
    ];
    for (group, names) in groups {
        for (index, name) in names.iter().enumerate() {
            if index > 0 {
                form.add_repeatable_entry(group);
            }
            form.update_repeatable_entry(group, index, name)?;
        }
    }

    Ok(form)
}

/// Payload, exact request body, and the digest header a search would send.
pub fn render_dry_run(payload: &QueryPayload, options: &ClientOptions) -> Result<String, AppError> {
    let pretty = serde_json::to_string_pretty(payload)
        .map_err(|e| AppError::Display(convert_serialize_error(e, "payload")))?;
    let body = encode_request_body(options.variant, payload)
        .map_err(|e| AppError::Display(convert_serialize_error(e, "request body")))?;

    let mut output = format!(
        "Payload:\n{}\n\nRequest body:\n{}\n",
        pretty,
        String::from_utf8_lossy(&body)
    );
    if options.integrity_header {
        output.push_str(&format!(
            "\n{}: {}\n",
            CONTENT_SHA256_HEADER,
            content_sha256(&body)
        ));
    }
    Ok(output)
}

fn spinner_wanted() -> bool {
    atty::is(atty::Stream::Stderr)
}

#[derive(Default)]
pub struct SearchHandler;

impl SearchHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: &SearchArgs,
        settings: &SearchSettings,
        verbose: bool,
    ) -> Result<(), AppError> {
        let form = build_form(args)?;

        if args.dry_run {
            let payload = form.build_payload(&settings.encoding);
            print!("{}", render_dry_run(&payload, &settings.client_options)?);
            return Ok(());
        }

        let client = settings.client()?;
        print_verbose(
            verbose,
            &format!(
                "Searching {} (variant {}, profile {})",
                client.endpoint, settings.client_options.variant, settings.profile_name
            ),
        );

        let service = SearchService::new(client, settings.encoding);
        let presenter = settings.presenter();

        let mut spinner = ProgressSpinner::searching();
        if spinner_wanted() {
            spinner.start();
        }
        service.submit(&form).await;
        spinner.stop();

        let session = service.session();
        if let Some(error) = session.error() {
            return Err(CliError::SearchFailed(error.to_string()).into());
        }
        if let Some(result) = session.result() {
            let rendered = presenter.render(result, form.skip().unwrap_or(0))?;
            presenter.print(&rendered)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FormHandler;

impl FormHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, settings: &SearchSettings, verbose: bool) -> Result<(), AppError> {
        let client = settings.client()?;
        print_verbose(verbose, &format!("Form submits to {}", client.endpoint));

        let service = SearchService::new(client, settings.encoding);
        let stdin = std::io::stdin();
        let mut editor = FormEditor::new(
            stdin.lock(),
            std::io::stdout(),
            service,
            settings.presenter(),
        )
        .with_spinner(spinner_wanted());
        editor.run().await
    }
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        profile_name: &str,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                print_verbose(verbose, "Showing configuration");
                print!("{}", render_config(config_service));
                Ok(())
            }
            ConfigCommands::Set { field, value } => {
                print_verbose(
                    verbose,
                    &format!("Setting {} on profile '{}'", field, profile_name),
                );
                config_service.set_profile_field(profile_name, &field, &value)?;
                config_service.save_config(config_path)?;
                println!("✅ Set {} = {} for profile '{}'", field, value, profile_name);
                Ok(())
            }
        }
    }
}

pub fn render_config(config_service: &ConfigService) -> String {
    let mut out = String::new();
    out.push_str("Current Configuration:\n");
    out.push_str("=====================\n");
    out.push_str(&format!(
        "Default Profile: {}\n",
        config_service
            .get_default_profile()
            .map(String::as_str)
            .unwrap_or("(not set)")
    ));

    out.push_str("\nProfiles:\n");
    let profiles = config_service.list_profiles();
    if profiles.is_empty() {
        out.push_str("  No profiles configured\n");
    }
    for (name, profile) in profiles {
        let options = profile.client_options();
        let encoding = profile.party_encoding();
        out.push_str(&format!("  [{}]\n", name));
        out.push_str(&format!(
            "    Endpoint: {}\n",
            profile.endpoint.as_deref().unwrap_or("(not set)")
        ));
        out.push_str(&format!("    Timeout: {} seconds\n", options.timeout_secs));
        out.push_str(&format!(
            "    Integrity header: {}\n",
            if options.integrity_header { "on" } else { "off" }
        ));
        out.push_str(&format!("    Query variant: {}\n", options.variant));
        out.push_str(&format!(
            "    Columns: {}\n",
            match profile.column_strategy() {
                ColumnStrategy::FirstRecord => "first-record".to_string(),
                ColumnStrategy::UnionOfAll => "union".to_string(),
                ColumnStrategy::Declared(columns) => format!("declared ({})", columns.join(", ")),
            }
        ));
        out.push_str(&format!(
            "    Party encoding: writers={}, publishers={}, performers={}\n",
            encoding.writers, encoding.publishers, encoding.performers
        ));
    }

    out.push_str(&format!("\nSettable fields: {}\n", SETTABLE_FIELDS.join(", ")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::Config;

    fn args() -> SearchArgs {
        SearchArgs::default()
    }

    #[test]
    fn test_build_form_scenario_one() {
        let search = SearchArgs {
            title: Some("Yesterday".to_string()),
            writers: vec!["Lennon".to_string()],
            skip: Some("0".to_string()),
            take: Some("20".to_string()),
            ..args()
        };
        let form = build_form(&search).unwrap();
        let payload =
            serde_json::to_value(form.build_payload(&PartyEncodingConfig::default())).unwrap();

        assert_eq!(payload["title"], "Yesterday");
        assert_eq!(payload["writers"], serde_json::json!(["Lennon"]));
        assert_eq!(payload["skip"], 0);
        assert_eq!(payload["take"], 20);
        assert!(payload.get("publishers").is_none());
        assert!(payload.get("performers").is_none());
    }

    #[test]
    fn test_build_form_repeated_parties_keep_order() {
        let search = SearchArgs {
            performers: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            ..args()
        };
        let form = build_form(&search).unwrap();
        assert_eq!(form.entries(RepeatableField::Performers), ["A", "B", "C"]);
        assert_eq!(form.entries(RepeatableField::Writers), [""]);
    }

    #[test]
    fn test_build_form_rejects_unknown_match_mode() {
        let search = SearchArgs {
            match_mode: Some("fuzzy".to_string()),
            ..args()
        };
        assert!(matches!(
            build_form(&search),
            Err(AppError::Cli(CliError::InvalidArguments(_)))
        ));

        let search = SearchArgs {
            match_mode: Some("contains".to_string()),
            ..args()
        };
        assert_eq!(
            build_form(&search).unwrap().title_match_mode(),
            TitleMatchMode::Contains
        );
    }

    #[test]
    fn test_dry_run_digest_matches_body() {
        let payload = QueryPayload {
            title: Some("Yesterday".to_string()),
            ..Default::default()
        };
        let options = ClientOptions::default();
        let rendered = render_dry_run(&payload, &options).unwrap();
        let body = encode_request_body(options.variant, &payload).unwrap();

        assert!(rendered.contains("\"title\": \"Yesterday\""));
        assert!(rendered.contains(&String::from_utf8(body.clone()).unwrap()));
        assert!(rendered.contains(&format!("{}: {}", CONTENT_SHA256_HEADER, content_sha256(&body))));

        let no_header = ClientOptions {
            integrity_header: false,
            ..Default::default()
        };
        assert!(
            !render_dry_run(&payload, &no_header)
                .unwrap()
                .contains(CONTENT_SHA256_HEADER)
        );
    }

    #[test]
    fn test_settings_resolution() {
        let profile = Profile {
            endpoint: Some("https://profile.test/graphql".to_string()),
            timeout_seconds: Some(10),
            query_variant: Some(QueryVariant::Compact),
            ..Default::default()
        };

        let settings =
            SearchSettings::resolve("default", Some(&profile), None, &RequestOptions::default());
        assert_eq!(settings.endpoint.as_deref(), Some("https://profile.test/graphql"));
        assert_eq!(settings.client_options.timeout_secs, 10);
        assert_eq!(settings.format, OutputFormat::Raw);

        let request = RequestOptions {
            variant: Some(QueryVariant::Full),
            keyword_parties: true,
            no_integrity_header: true,
            timeout: Some(0),
            ..Default::default()
        };
        let settings = SearchSettings::resolve(
            "default",
            Some(&profile),
            Some("https://flag.test/graphql"),
            &request,
        );
        assert_eq!(settings.endpoint.as_deref(), Some("https://flag.test/graphql"));
        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.client_options.timeout_secs, 10);
        assert!(!settings.client_options.integrity_header);
        assert_eq!(settings.encoding, PartyEncodingConfig::uniform(PartyEncoding::Keyword));
    }

    #[test]
    fn test_client_requires_endpoint() {
        let settings = SearchSettings::resolve("work", None, None, &RequestOptions::default());
        assert!(matches!(
            settings.client(),
            Err(AppError::Cli(CliError::EndpointMissing { ref profile })) if profile == "work"
        ));
    }

    #[test]
    fn test_render_config() {
        let mut service = ConfigService::new(Config::default());
        assert!(render_config(&service).contains("No profiles configured"));

        service
            .set_profile_field("default", "endpoint", "https://example.test/graphql")
            .unwrap();
        service.set_profile_field("default", "columns", "iswc,akas").unwrap();
        let text = render_config(&service);
        assert!(text.contains("Default Profile: default"));
        assert!(text.contains("Endpoint: https://example.test/graphql"));
        assert!(text.contains("Columns: declared (iswc, akas)"));
        assert!(text.contains("writers=plain"));
    }
}
