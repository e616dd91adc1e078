use clap::{Parser, Subcommand};
use std::process::ExitCode;

use i18n_sync_rust::{Config, Operation, RunStatus};

#[derive(Parser, Debug)]
#[command(
    name = "i18n-sync-rust",
    version,
    about = "Keep parallel JSON translation dictionaries in sync"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Never prompt; verify exits non-zero when drift is found
    #[arg(long = "unattended")]
    unattended: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upsert a key in every dictionary
    #[command(name = "create-or-update", visible_alias = "set")]
    CreateOrUpdate {
        key: String,
        /// One base text (automatic mode) or one text per configured language
        /// (manual mode, positional)
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Print each language's value for a key
    Read { key: String },
    /// Delete a key from every dictionary that has it
    Remove { key: String },
    /// Check that all dictionaries share the same key set
    Verify,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if i18n_sync_rust::logging::init(cli.verbose).is_err() {
        eprintln!("failed to initialize logging");
        return ExitCode::FAILURE;
    }

    let operation = cli.command.map(|command| match command {
        Command::CreateOrUpdate { key, texts } => Operation::CreateOrUpdate { key, texts },
        Command::Read { key } => Operation::Read { key },
        Command::Remove { key } => Operation::Remove { key },
        Command::Verify => Operation::Verify,
    });

    let config = Config {
        operation,
        unattended: cli.unattended || ci_env(),
        settings_path: cli.read_settings,
    };

    match i18n_sync_rust::run(config).await {
        Ok(RunStatus::Clean) => ExitCode::SUCCESS,
        Ok(RunStatus::Drift) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

/// Continuous-integration environments set CI, which selects the unattended
/// verify behavior.
fn ci_env() -> bool {
    std::env::var("CI")
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}
