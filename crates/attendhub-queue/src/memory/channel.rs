//! In-process queue over a bounded tokio channel.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use attendhub_core::error::AppError;
use attendhub_core::result::AppResult;
use attendhub_core::traits::queue::{MessageQueue, MessageStream};
use attendhub_core::types::Message;

/// Bounded FIFO queue living in process memory.
///
/// Publishers wait when the buffer is full. Buffered messages are lost on
/// restart. Several consumers may share the queue; each message goes to
/// exactly one of them.
#[derive(Debug, Clone)]
pub struct MemoryQueue {
    sender: mpsc::Sender<Message>,
    receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
    capacity: usize,
}

impl MemoryQueue {
    /// Create a queue holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            capacity: capacity.max(1),
        }
    }

    /// Configured buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages currently buffered.
    pub fn len(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn publish(&self, message: Message, cancel: &CancellationToken) -> AppResult<()> {
        let message = match self.sender.try_send(message) {
            Ok(()) => return Ok(()),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                return Err(AppError::queue("In-memory queue is closed"));
            }
            Err(mpsc::error::TrySendError::Full(message)) => message,
        };

        debug!(capacity = self.capacity, "In-memory queue full, waiting for capacity");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::service_unavailable(
                "Publish cancelled while waiting for queue capacity",
            )),
            sent = self.sender.send(message) => {
                sent.map_err(|_| AppError::queue("In-memory queue is closed"))
            }
        }
    }

    async fn consume(&self, cancel: CancellationToken) -> AppResult<MessageStream> {
        let receiver = Arc::clone(&self.receiver);
        let messages = stream::unfold((receiver, cancel), |(receiver, cancel)| async move {
            let next = {
                let mut guard = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    guard = receiver.lock() => guard,
                };
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    message = guard.recv() => message,
                }
            };
            next.map(|message| (message, (receiver, cancel)))
        });
        Ok(Box::pin(messages))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.sender.is_closed())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
