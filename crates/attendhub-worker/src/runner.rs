//! Worker runner: consumes the queue and processes messages one at a time.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use attendhub_core::config::worker::WorkerConfig;
use attendhub_core::result::AppResult;
use attendhub_core::traits::queue::MessageQueue;

use crate::processor::CheckinProcessor;

/// Main worker loop.
#[derive(Debug, Clone)]
pub struct WorkerRunner {
    /// Message source
    queue: Arc<dyn MessageQueue>,
    /// Per-message handling
    processor: Arc<CheckinProcessor>,
    /// Worker configuration
    config: WorkerConfig,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        processor: Arc<CheckinProcessor>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            processor,
            config,
        }
    }

    /// Run until `cancel` fires or the queue stream ends. Returns the number
    /// of messages handled.
    ///
    /// Messages are processed strictly sequentially. Cancellation is observed
    /// between messages, so a message taken off the queue is always handled.
    pub async fn run(&self, cancel: CancellationToken) -> AppResult<u64> {
        let verifier = self.processor.verifier();
        if self.config.probe_on_start {
            match verifier.health().await {
                Ok(()) => info!(verifier = verifier.name(), "Face verifier reachable"),
                Err(e) => warn!(
                    verifier = verifier.name(),
                    error = %e,
                    "Face verifier probe failed, continuing"
                ),
            }
        }

        let mut stream = self.queue.consume(cancel.clone()).await?;
        info!(
            backend = self.queue.backend_name(),
            pause_ms = self.config.pause_ms,
            "Worker started"
        );

        let pause = self.config.pause();
        let mut handled = 0u64;
        while let Some(message) = stream.next().await {
            let outcome = self.processor.process(&message).await;
            handled += 1;
            debug!(?outcome, "Message handled");

            if cancel.is_cancelled() {
                break;
            }
            if !pause.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }

        info!(handled, "Worker stopped");
        Ok(handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use attendhub_core::types::Message;
    use attendhub_database::store::{EventStore, MemoryEventStore};
    use attendhub_entity::event::{EventStatus, NewEvent};
    use attendhub_queue::memory::MemoryQueue;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::verifier::FixtureFaceVerifier;

    #[tokio::test]
    async fn test_runner_finalizes_published_events_and_stops_on_cancel() {
        let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        let now = Utc::now();
        store.upsert_device("kiosk-1", now).await.unwrap();

        let queue: Arc<dyn MessageQueue> = Arc::new(MemoryQueue::new(8));
        let processor = Arc::new(CheckinProcessor::new(
            store.clone(),
            Arc::new(FixtureFaceVerifier::new(0.95)),
        ));
        let runner = WorkerRunner::new(queue.clone(), processor, WorkerConfig::default());

        let cancel = CancellationToken::new();
        let handle = tokio::spawn({
            let runner = runner.clone();
            let cancel = cancel.clone();
            async move { runner.run(cancel).await }
        });

        let mut ids = Vec::new();
        for user in ["emp-1", "emp-2", "emp-3"] {
            let id = Uuid::new_v4();
            store
                .insert_event_unless_recent(
                    NewEvent {
                        id,
                        user_id: user.to_string(),
                        device_id: "kiosk-1".to_string(),
                        occurred_at: now,
                        location: None,
                        image_ref: "img://1".to_string(),
                    },
                    now,
                )
                .await
                .unwrap();
            queue.publish(Message::checkin(id), &cancel).await.unwrap();
            ids.push(id);
        }

        for _ in 0..200 {
            let mut done = true;
            for id in &ids {
                let event = store.get_event(*id).await.unwrap().unwrap();
                done &= event.status == EventStatus::Processed;
            }
            if done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        cancel.cancel();
        let handled = handle.await.unwrap().unwrap();
        assert_eq!(handled, 3);
        for id in ids {
            let event = store.get_event(id).await.unwrap().unwrap();
            assert_eq!(event.status, EventStatus::Processed);
            assert_eq!(event.match_score, Some(0.95));
        }
    }

    #[tokio::test]
    async fn test_failed_probe_does_not_stop_worker() {
        let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        let queue: Arc<dyn MessageQueue> = Arc::new(MemoryQueue::new(4));
        let processor = Arc::new(CheckinProcessor::new(
            store,
            Arc::new(FixtureFaceVerifier::failing("offline")),
        ));
        let runner = WorkerRunner::new(queue, processor, WorkerConfig::default());

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(runner.run(cancel).await.unwrap(), 0);
    }
}
