//! rata-metadata - Network Rail reference data reload tool

use clap::{ArgAction, Parser};
use inquire::{Password, PasswordDisplayMode};
use rata_common::logging::{init_logging, LogConfig, LogGuard, LogLevel};
use rata_metadata::config::{DEFAULT_DATABASE_HOST, DEFAULT_DATABASE_PORT, DEFAULT_FEED_URL};
use rata_metadata::{
    DatabaseConfig, FeedClient, FeedConfig, RataError, ReloadCoordinator, ReloadOptions,
    ReloadStrategy, ReloadSummary,
};
use sqlx::{Connection, PgConnection};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// `-h` selects the database host, as in psql, so help is `--help` only
#[derive(Parser, Debug)]
#[command(name = "rata-metadata")]
#[command(author, version, about = "Reload SMART and CORPUS reference data into PostgreSQL")]
#[command(disable_help_flag = true)]
struct Cli {
    /// Name of the database to connect to
    #[arg(short = 'd', long)]
    dbname: String,

    /// Host name of the database server
    #[arg(short = 'h', long, default_value = DEFAULT_DATABASE_HOST)]
    host: String,

    /// Port the database server listens on
    #[arg(short = 'p', long, default_value_t = DEFAULT_DATABASE_PORT)]
    port: u16,

    /// Database user name
    #[arg(short = 'U', long)]
    username: String,

    /// Prompt for the database password before connecting
    #[arg(short = 'W', long)]
    password: bool,

    /// Test only: run the full reload, then roll back instead of committing
    #[arg(short = 't', long = "test")]
    dry_run: bool,

    /// Feed root URL
    #[arg(long, env = "NROD_FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// Feed account user name
    #[arg(long, env = "NROD_FEED_USERNAME")]
    feed_username: String,

    /// Feed account password
    #[arg(long, env = "NROD_FEED_PASSWORD", hide_env_values = true)]
    feed_password: String,

    /// Per-request feed timeout in seconds
    #[arg(long, env = "NROD_FEED_TIMEOUT_SECS")]
    feed_timeout: Option<u64>,

    /// Download both datasets before opening the transaction
    #[arg(long)]
    prefetch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _guard = match setup_logging(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        },
    };

    match run(cli).await {
        Ok(summary) => {
            info!(
                berth_steps = summary.berth_steps,
                locations = summary.locations,
                outcome = ?summary.outcome,
                "Reference data reload complete"
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            let stage = e.stage();
            error!(
                %stage,
                error = %format!("{:#}", anyhow::Error::new(e)),
                "Reference data reload failed"
            );
            ExitCode::FAILURE
        },
    }
}

fn setup_logging(verbose: bool) -> anyhow::Result<LogGuard> {
    let level = if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over flags
    let config = LogConfig::builder()
        .level(level)
        .log_file_prefix("rata-metadata")
        .build()
        .merge_env()?;

    init_logging(&config)
}

async fn run(cli: Cli) -> rata_metadata::Result<ReloadSummary> {
    let mut database = DatabaseConfig::new(cli.dbname, cli.username);
    database.host = cli.host;
    database.port = cli.port;
    if cli.password {
        database.password = Some(prompt_password()?);
    }
    database.validate()?;

    let feed_config = FeedConfig::new(cli.feed_username, cli.feed_password)
        .with_base_url(cli.feed_url)
        .with_timeout_secs(cli.feed_timeout);
    let feed = FeedClient::new(feed_config)?;

    let options = ReloadOptions {
        dry_run: cli.dry_run,
        strategy: if cli.prefetch {
            ReloadStrategy::Prefetch
        } else {
            ReloadStrategy::Streaming
        },
    };

    info!(
        host = %database.host,
        port = database.port,
        dbname = %database.dbname,
        "Connecting to database"
    );
    let mut conn = PgConnection::connect_with(&database.connect_options())
        .await
        .map_err(|source| RataError::Persistence {
            operation: "connecting to database",
            source,
        })?;

    let result = ReloadCoordinator::new(&mut conn, &feed).run(options).await;

    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close database connection cleanly");
    }

    result
}

fn prompt_password() -> rata_metadata::Result<String> {
    Password::new("Password:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Hidden)
        .prompt()
        .map_err(|e| RataError::config(format!("Failed to read password: {}", e)))
}
