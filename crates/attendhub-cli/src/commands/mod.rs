//! CLI command definitions and dispatch.

pub mod device;
pub mod events;
pub mod migrate;
pub mod serve;
pub mod worker;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use attendhub_core::config::AppConfig;
use attendhub_core::config::database::PROVIDER_POSTGRES;
use attendhub_core::error::AppError;
use attendhub_database::connection::DatabasePool;
use attendhub_database::store::{EventStore, connect_event_store};

use crate::output::{self, OutputFormat};

/// AttendHub: identity check-in ingestion and verification
#[derive(Debug, Parser)]
#[command(name = "attendhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file. Without it, `config/default.toml` and
    /// the `config/{env}.toml` overlay are used.
    #[arg(short, long, env = "ATTENDHUB_CONFIG")]
    pub config: Option<String>,

    /// Configuration environment overlay
    #[arg(long, env = "ATTENDHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the API server with the embedded worker
    Serve(serve::ServeArgs),
    /// Run a standalone verification worker (Redis queue only)
    Worker(worker::WorkerArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Device management
    Device(device::DeviceArgs),
    /// Check-in event queries
    Events(events::EventsArgs),
}

impl Cli {
    /// Load configuration from `--config` or the environment overlay.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        match &self.config {
            Some(path) => AppConfig::load_file(path),
            None => AppConfig::load(&self.env),
        }
    }

    /// Whether the command runs until interrupted.
    pub fn is_long_running(&self) -> bool {
        matches!(self.command, Commands::Serve(_) | Commands::Worker(_))
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Worker(args) => worker::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, config, self.format).await,
            Commands::Device(args) => device::execute(args, config, self.format).await,
            Commands::Events(args) => events::execute(args, config, self.format).await,
        }
    }
}

/// Helper: connect to PostgreSQL, rejecting other providers.
pub async fn connect_postgres(config: &AppConfig) -> Result<DatabasePool, AppError> {
    if config.database.provider != PROVIDER_POSTGRES {
        return Err(AppError::configuration(format!(
            "This command requires database.provider = \"{PROVIDER_POSTGRES}\""
        )));
    }
    DatabasePool::connect(&config.database).await
}

/// Helper: open the configured event store. A memory store is empty and
/// discarded on exit, so warn about it.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn EventStore>, AppError> {
    let store = connect_event_store(&config.database).await?;
    if store.backend_name() != PROVIDER_POSTGRES {
        output::print_warning("Using the in-memory event store; nothing will be persisted.");
    }
    Ok(store)
}
