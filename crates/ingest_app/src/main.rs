use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

mod platform;

use platform::logging::LogDestination;

/// Validate, deduplicate and upload wallet address lists.
#[derive(Debug, Parser)]
#[command(name = "ingest", version, about)]
pub(crate) struct Cli {
    /// RON config file; defaults to ./ingest.ron when present.
    #[arg(long, global = true, env = "INGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where log output goes; overrides the config file.
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogDestination>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress lines on stderr.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Process an input and print what an upload would send.
    Check(InputArgs),
    /// Process an input and upload the valid addresses in batches.
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub(crate) struct InputArgs {
    /// Input file, or `-` to read pasted text from stdin.
    pub input: PathBuf,

    /// Only accept `0x` + 40 hex digit addresses.
    #[arg(long)]
    pub strict: bool,

    /// Addresses per batch; clamped to the configured bounds.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Write invalid lines and duplicates as JSON into this directory.
    #[arg(long, value_name = "DIR")]
    pub rejects: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct UploadArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Survey (or other target) the addresses belong to.
    #[arg(long)]
    pub target: String,

    /// Replace the target's existing addresses instead of appending.
    #[arg(long)]
    pub replace: bool,

    /// Base URL of the address store API.
    #[arg(long, env = "INGEST_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, env = "INGEST_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match platform::app::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
