//! Check-in event queries.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use attendhub_core::config::AppConfig;
use attendhub_core::error::AppError;
use attendhub_entity::event::{Event, EventQuery};

use crate::output::{self, OutputFormat};

/// Arguments for the events command
#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Events subcommand
    #[command(subcommand)]
    pub command: EventsCommand,
}

/// Events subcommands
#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List events, newest first
    List {
        /// Only events from this device
        #[arg(long)]
        device_id: Option<String>,
        /// Only events for this user
        #[arg(long)]
        user_id: Option<String>,
        /// Page size
        #[arg(long)]
        limit: Option<i64>,
        /// Rows to skip
        #[arg(long)]
        offset: Option<i64>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct EventRow {
    id: String,
    user: String,
    device: String,
    occurred_at: String,
    status: String,
    score: String,
    location: String,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            user: event.user_id.clone(),
            device: event.device_id.clone(),
            occurred_at: event.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: event.status.to_string(),
            score: event
                .match_score
                .map(|s| format!("{s:.3}"))
                .unwrap_or_else(|| "-".to_string()),
            location: event.location.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute events commands
pub async fn execute(
    args: &EventsArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        EventsCommand::List {
            device_id,
            user_id,
            limit,
            offset,
        } => {
            let store = super::open_store(&config).await?;
            let events = store
                .list_events(&EventQuery {
                    device_id: device_id.clone(),
                    user_id: user_id.clone(),
                    limit: *limit,
                    offset: *offset,
                })
                .await?;

            match format {
                OutputFormat::Json => output::print_list_json(&events),
                OutputFormat::Table => {
                    let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
    }
    Ok(())
}
