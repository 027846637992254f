//! Logger setup and user-facing verbose notes.

use env_logger::Env;

/// Default filter when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "worksearch=debug" } else { "warn" }
}

/// Installs env_logger on stderr. `RUST_LOG` wins over `verbose`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter(verbose)))
        .format_timestamp(None)
        .format_target(verbose)
        .try_init();
}

pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        eprintln!("Verbose: {}", msg);
    }
}
