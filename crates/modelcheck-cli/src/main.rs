mod logging;
mod run;
mod settings;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use logging::{LoggingError, init_logging};
use modelcheck_core::document_json_schema;
use settings::{LogFormat, SettingsError, load_settings};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "modelcheck", version, about = "Validate models.yml schema descriptions")]
struct Cli {
    /// Settings file (defaults to ./modelcheck.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    /// Log filter directive, e.g. `debug` or `modelcheck_validate=trace`.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check one or more models files.
    Check(CheckArgs),
    /// Print the JSON Schema of the models document format.
    Schema,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Models files to check (defaults to `models` from the settings).
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn execute(cli: Cli) -> Result<bool, CliError> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    init_logging(&settings.logging)?;

    match cli.command {
        Command::Check(args) => {
            let files = if args.files.is_empty() {
                settings.models
            } else {
                args.files
            };
            if files.is_empty() {
                return Err(CliError::InvalidConfig(
                    "no models files given and none configured".to_string(),
                ));
            }
            tracing::debug!(event = "run_started", files = files.len());
            let stdout = io::stdout();
            Ok(run::run_checks(&files, &mut stdout.lock())?)
        }
        Command::Schema => {
            let json = serde_json::to_string_pretty(&document_json_schema())?;
            println!("{json}");
            Ok(true)
        }
    }
}
