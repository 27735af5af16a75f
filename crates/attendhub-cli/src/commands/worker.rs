//! Run a standalone verification worker.

use clap::Args;

use attendhub_api::Application;
use attendhub_api::app::shutdown_signal;
use attendhub_core::config::AppConfig;
use attendhub_core::config::queue::BACKEND_REDIS;
use attendhub_core::error::AppError;

use crate::output;

/// Arguments for the worker command
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Skip the face verifier health probe
    #[arg(long)]
    pub no_probe: bool,
}

/// Execute the worker command
pub async fn execute(args: &WorkerArgs, mut config: AppConfig) -> Result<(), AppError> {
    if config.queue.backend != BACKEND_REDIS {
        return Err(AppError::configuration(format!(
            "A standalone worker needs queue.backend = \"{BACKEND_REDIS}\"; \
             the in-memory queue is only reachable from `serve`"
        )));
    }
    config.worker.enabled = true;
    if args.no_probe {
        config.worker.probe_on_start = false;
    }

    println!("Starting AttendHub worker...");
    println!("  Queue key: {}", config.queue.redis_key);
    println!("  Verifier:  {}", config.face.mode);

    let app = Application::build(config).await?;
    let handled = app.run_worker(shutdown_signal()).await?;
    output::print_success(&format!("Worker stopped after {handled} message(s)."));
    Ok(())
}
