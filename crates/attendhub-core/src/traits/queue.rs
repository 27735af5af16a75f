//! Message queue trait for pluggable queue backends.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::result::AppResult;
use crate::types::message::Message;

/// A lazy, unbounded stream of consumed messages.
///
/// The stream ends once the cancellation token passed to
/// [`MessageQueue::consume`] fires, and is never restarted.
pub type MessageStream = BoxStream<'static, Message>;

/// Trait for queue backends (bounded in-process channel or Redis list).
///
/// Both backends deliver each message to at most one consumer, in
/// publish order.
#[async_trait]
pub trait MessageQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Enqueue a message.
    ///
    /// May wait for capacity; fails fast if `cancel` fires while waiting.
    async fn publish(&self, message: Message, cancel: &CancellationToken) -> AppResult<()>;

    /// Start consuming. The returned stream yields messages until `cancel` fires.
    async fn consume(&self, cancel: CancellationToken) -> AppResult<MessageStream>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Short backend identifier for logs.
    fn backend_name(&self) -> &'static str;
}
