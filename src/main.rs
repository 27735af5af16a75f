//! AttendHub server: identity check-in ingestion and verification.
//!
//! Main entry point: loads configuration, initializes logging, and hands
//! off to the [`Application`] composition root.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use attendhub_api::Application;
use attendhub_api::app::shutdown_signal;
use attendhub_core::config::AppConfig;
use attendhub_core::config::logging::LogFormat;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e:#}");
        std::process::exit(1);
    }
}

/// Load configuration from `ATTENDHUB_CONFIG`, or from `config/default.toml`
/// plus the `config/{ATTENDHUB_ENV}.toml` overlay.
fn load_configuration() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("ATTENDHUB_CONFIG") {
        Ok(path) => AppConfig::load_file(&path)
            .with_context(|| format!("loading configuration from '{path}'"))?,
        Err(_) => {
            let env =
                std::env::var("ATTENDHUB_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
                .with_context(|| format!("loading configuration for environment '{env}'"))?
        }
    };
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database.provider,
        queue = %config.queue.backend,
        face = %config.face.mode,
        worker = config.worker.enabled,
        "Starting AttendHub"
    );

    let app = Application::build(config)
        .await
        .context("assembling application")?;
    app.run(shutdown_signal()).await.context("serving HTTP")?;
    Ok(())
}
