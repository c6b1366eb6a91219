use clap::Parser;
use log::{LevelFilter, error};
use repocard_lib::commands::{self, AppError};
use repocard_lib::config::{CONFIG_FILE_NAME, Settings};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for the repocard CLI binary
#[derive(Debug, Error)]
enum RepocardError {
    /// The repository argument could not be parsed as OWNER/NAME.
    #[error("invalid format: expected OWNER/NAME (e.g., rust-lang/cargo), got: {input}")]
    InvalidRepository { input: String },

    /// Command orchestration failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// The result could not be rendered as JSON.
    #[error("failed to render result as JSON")]
    Render(#[source] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Parser)]
#[command(name = "repocard")]
#[command(about = "Print a Github repository card fetched over GraphQL", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository to describe (e.g., rust-lang/cargo)
    #[arg(value_name = "OWNER/NAME")]
    repository: Option<String>,

    /// GraphQL endpoint to query
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Env file to load before reading the token; pass "" to skip
    #[arg(long, value_name = "PATH")]
    env_file: Option<String>,

    /// Example env file that must exist; pass "" to skip
    #[arg(long, value_name = "PATH")]
    example_file: Option<String>,

    /// Settings file [default: repocard.toml in the current directory]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RepocardError::App(AppError::Env(e))) => {
            error!("{e}\n\n{}", e.hint());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RepocardError> {
    let cwd = std::env::current_dir()?;

    let settings = match &cli.config {
        Some(path) => Settings::load(path).map_err(AppError::from)?,
        None => Settings::load_or_default(&cwd.join(CONFIG_FILE_NAME)).map_err(AppError::from)?,
    };
    let settings = apply_overrides(settings, cli)?;

    let outcome = commands::app::card(&settings, &cwd)?;

    let rendered = serde_json::to_string_pretty(&outcome).map_err(RepocardError::Render)?;
    writeln!(std::io::stdout().lock(), "{rendered}")?;
    Ok(())
}

/// # Errors
///
/// Returns [`RepocardError::InvalidRepository`] if the repository argument is not OWNER/NAME.
fn apply_overrides(mut settings: Settings, cli: Cli) -> Result<Settings, RepocardError> {
    if let Some(repository) = cli.repository {
        let (owner, name) = parse_repository(&repository)?;
        settings.owner = owner.to_owned();
        settings.name = name.to_owned();
    }
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint;
    }
    if let Some(env_file) = cli.env_file {
        settings.env_file = PathBuf::from(env_file);
    }
    if let Some(example_file) = cli.example_file {
        settings.example_file = PathBuf::from(example_file);
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout = Duration::from_secs(timeout);
    }
    Ok(settings)
}

fn parse_repository(input: &str) -> Result<(&str, &str), RepocardError> {
    match input.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(RepocardError::InvalidRepository {
            input: input.to_owned(),
        }),
    }
}

/// Initialize logging based on the verbosity level specified in the CLI
fn init_logging(cli: &Cli) {
    let mut builder = env_logger::builder();
    builder
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format(|buf, record| {
            let level = record.level();
            let style = &buf.default_level_style(level);
            writeln!(buf, "[{style}{level}{style:#}] {}", record.args())
        });

    if !cli.verbose {
        builder.format_timestamp(None);
    }

    builder.init();
}
