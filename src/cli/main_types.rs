use crate::api::query::QueryVariant;
use crate::display::table::OutputFormat;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "worksearch")]
#[command(about = "Search the musical works catalogue from the command line")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Search endpoint, overriding the profile
    #[arg(long, global = true, env = "WORKSEARCH_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one search from flags
    Search(Box<SearchArgs>),
    /// Edit a search form interactively
    Form(RequestOptions),
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Request and output settings shared by `search` and `form`.
#[derive(Args, Debug, Clone, Default)]
pub struct RequestOptions {
    /// Field selection sent to the gateway
    #[arg(long, value_enum)]
    pub variant: Option<QueryVariant>,

    /// Output format (default: table, or raw for the compact variant)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Send every party entry as {"nameKeyword": ...}
    #[arg(long)]
    pub keyword_parties: bool,

    /// Do not attach the x-amz-content-sha256 header
    #[arg(long)]
    pub no_integrity_header: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    #[arg(long)]
    pub title: Option<String>,

    /// StartsWith, Contains or Exact
    #[arg(long)]
    pub match_mode: Option<String>,

    #[arg(long)]
    pub work_id: Option<String>,

    #[arg(long)]
    pub iswc: Option<String>,

    #[arg(long)]
    pub ipi: Option<String>,

    #[arg(long)]
    pub catalogue_number: Option<String>,

    /// Writer name, repeatable
    #[arg(long = "writer", action = clap::ArgAction::Append)]
    pub writers: Vec<String>,

    /// Publisher name, repeatable
    #[arg(long = "publisher", action = clap::ArgAction::Append)]
    pub publishers: Vec<String>,

    /// Performer name, repeatable
    #[arg(long = "performer", action = clap::ArgAction::Append)]
    pub performers: Vec<String>,

    #[arg(long)]
    pub skip: Option<String>,

    #[arg(long)]
    pub take: Option<String>,

    /// Print the payload and request body without sending
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub request: RequestOptions,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set one profile field
    Set {
        /// endpoint, timeout, integrity-header, variant, columns or <group>-encoding
        field: String,
        value: String,
    },
}
