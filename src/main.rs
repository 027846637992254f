use clap::Parser;
use std::path::PathBuf;
use worksearch::cli::dispatcher::Dispatcher;
use worksearch::cli::main_types::Cli;
use worksearch::storage::config::Config;
use worksearch::utils::logging::{init_logging, print_verbose};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_dir = cli.config_dir.as_deref().map(PathBuf::from);
    let config_path = match Config::resolve_path(config_dir.as_deref()) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let config = match Config::load(Some(config_path.clone())) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    let profile_name = config.active_profile_name(cli.profile.as_deref());
    print_verbose(cli.verbose, &format!("Using profile: {}", profile_name));
    print_verbose(
        cli.verbose,
        &format!("Using config file: {}", config_path.display()),
    );

    let dispatcher = Dispatcher::new(
        config,
        Some(config_path),
        profile_name,
        cli.endpoint,
        cli.verbose,
    );

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        log::debug!("command failed: {:?} (severity {:?})", e, e.severity());
        eprintln!("Error: {}", e.user_message());
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}
