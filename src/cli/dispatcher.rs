use crate::cli::command_handlers::{ConfigHandler, FormHandler, SearchHandler, SearchSettings};
use crate::cli::main_types::{Commands, RequestOptions};
use crate::core::services::config_service::ConfigService;
use crate::error::AppError;
use crate::storage::config::Config;
use crate::utils::logging::print_verbose;
use std::path::PathBuf;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    profile_name: String,
    endpoint_override: Option<String>,
    verbose: bool,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        profile_name: String,
        endpoint_override: Option<String>,
        verbose: bool,
    ) -> Self {
        Self {
            config,
            config_path,
            profile_name,
            endpoint_override,
            verbose,
        }
    }

    fn settings(&self, request: &RequestOptions) -> SearchSettings {
        let profile = self.config.get_profile(&self.profile_name);
        if profile.is_none() {
            print_verbose(
                self.verbose,
                &format!("Profile '{}' not configured, using defaults", self.profile_name),
            );
        }
        SearchSettings::resolve(
            &self.profile_name,
            profile,
            self.endpoint_override.as_deref(),
            request,
        )
    }

    pub async fn dispatch(self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Search(args) => {
                let settings = self.settings(&args.request);
                SearchHandler::new()
                    .handle(&args, &settings, self.verbose)
                    .await
            }
            Commands::Form(request) => {
                let settings = self.settings(&request);
                FormHandler::new().handle(&settings, self.verbose).await
            }
            Commands::Config { command } => {
                let mut config_service = ConfigService::new(self.config);
                ConfigHandler::new()
                    .handle(
                        command,
                        &mut config_service,
                        &self.profile_name,
                        self.config_path,
                        self.verbose,
                    )
                    .await
            }
        }
    }
}
