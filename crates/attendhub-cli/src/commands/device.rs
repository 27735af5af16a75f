//! Device management commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;

use attendhub_auth::jwt::{JwtDecoder, JwtEncoder};
use attendhub_core::config::AppConfig;
use attendhub_core::error::AppError;
use attendhub_core::traits::clock::{Clock, SystemClock};
use attendhub_service::checkin::CheckinService;
use attendhub_service::session::DeviceSessionService;

use crate::output::{self, OutputFormat};

/// Arguments for the device command
#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Device subcommand
    #[command(subcommand)]
    pub command: DeviceCommand,
}

/// Device subcommands
#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Register a device and print its tokens
    Register {
        /// Device identifier
        device_id: String,
    },
    /// Show when a device was registered
    Show {
        /// Device identifier
        device_id: String,
    },
}

#[derive(Debug, Serialize)]
struct IssuedTokens {
    device_id: String,
    access_token: String,
    access_expires_at: String,
    refresh_token: String,
    refresh_expires_at: String,
}

/// Execute device commands
pub async fn execute(
    args: &DeviceArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        DeviceCommand::Register { device_id } => {
            let store = super::open_store(&config).await?;
            let clock: Arc<dyn Clock> = Arc::new(SystemClock);
            let checkins = Arc::new(CheckinService::from_config(
                Arc::clone(&store),
                Arc::clone(&clock),
                &config.checkin,
            )?);
            let sessions = DeviceSessionService::new(
                checkins,
                store,
                Arc::new(JwtEncoder::new(&config.auth, Arc::clone(&clock))),
                Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&clock))),
                clock,
            );

            let pair = sessions.register(device_id).await?;
            if format == OutputFormat::Table {
                output::print_success(&format!("Device '{device_id}' registered."));
            }
            output::print_record(
                &IssuedTokens {
                    device_id: device_id.clone(),
                    access_token: pair.access_token,
                    access_expires_at: pair.access_expires_at.to_rfc3339(),
                    refresh_token: pair.refresh_token,
                    refresh_expires_at: pair.refresh_expires_at.to_rfc3339(),
                },
                format,
            );
        }
        DeviceCommand::Show { device_id } => {
            let store = super::open_store(&config).await?;
            let device = store.find_device(device_id).await?.ok_or_else(|| {
                AppError::not_found(format!("Device '{device_id}' is not registered"))
            })?;
            output::print_record(&device, format);
        }
    }
    Ok(())
}
