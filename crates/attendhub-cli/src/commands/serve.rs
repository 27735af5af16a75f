//! Start the AttendHub server.

use clap::Args;

use attendhub_api::Application;
use attendhub_api::app::shutdown_signal;
use attendhub_core::config::AppConfig;
use attendhub_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Do not run the embedded worker (requires the Redis queue)
    #[arg(long)]
    pub no_worker: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_worker {
        config.worker.enabled = false;
    }

    println!("Starting AttendHub server...");
    println!("  Address: {}", config.server.bind_address());
    println!("  Store:   {}", config.database.provider);
    println!("  Queue:   {}", config.queue.backend);
    println!("  Worker:  {}", if config.worker.enabled { "embedded" } else { "external" });

    let app = Application::build(config).await?;
    app.run(shutdown_signal()).await
}
