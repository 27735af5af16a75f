//! Durable queue over a Redis list.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use redis::aio::MultiplexedConnection;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;
use attendhub_core::traits::queue::{MessageQueue, MessageStream};
use attendhub_core::types::Message;

use super::client::RedisClient;
use crate::codec;

/// Backoff after a failed pop before trying again.
const POP_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Slack on top of the blocking-pop timeout before the client gives up on a reply.
const POP_REPLY_MARGIN: Duration = Duration::from_secs(5);

/// Queue stored in a Redis list: `LPUSH` on publish, `BRPOP` on consume.
///
/// Messages survive process restarts as long as Redis persists them. There
/// is no acknowledgment: a consumer that pops a message and crashes before
/// finishing it loses that message.
#[derive(Debug, Clone)]
pub struct RedisQueue {
    client: RedisClient,
    key: String,
    block_timeout: Duration,
}

impl RedisQueue {
    /// Create a queue on list `key`. Each blocking pop waits at most `block_timeout`.
    pub fn new(client: RedisClient, key: impl Into<String>, block_timeout: Duration) -> Self {
        Self {
            client,
            key: key.into(),
            block_timeout,
        }
    }
}

/// Per-stream state threaded through `unfold`.
struct PopLoop {
    conn: MultiplexedConnection,
    key: String,
    timeout_seconds: u64,
    cancel: CancellationToken,
}

impl PopLoop {
    /// Pop until a decodable message arrives or cancellation is observed.
    ///
    /// Cancellation is checked between pops, never during one, so a message
    /// already taken off the list is always handed to the caller.
    async fn next_message(&mut self) -> Option<Message> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            let popped: Result<Option<(String, Vec<u8>)>, redis::RedisError> = redis::cmd("BRPOP")
                .arg(&self.key)
                .arg(self.timeout_seconds)
                .query_async(&mut self.conn)
                .await;

            match popped {
                Ok(Some((_, frame))) => match codec::decode(&frame) {
                    Ok(message) => return Some(message),
                    Err(e) => warn!(key = %self.key, error = %e, "Dropping undecodable queue frame"),
                },
                Ok(None) => debug!(key = %self.key, "BRPOP timed out, polling again"),
                Err(e) => {
                    warn!(key = %self.key, error = %e, "BRPOP failed, retrying");
                    tokio::select! {
                        _ = self.cancel.cancelled() => return None,
                        _ = tokio::time::sleep(POP_RETRY_DELAY) => {}
                    }
                }
            }
        }
    }
}

#[async_trait]
impl MessageQueue for RedisQueue {
    /// `LPUSH` never waits for capacity, so there is nothing to cancel.
    async fn publish(&self, message: Message, _cancel: &CancellationToken) -> AppResult<()> {
        let frame = codec::encode(&message)?;
        let mut conn = self.client.conn_mut();
        redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(frame.as_ref())
            .query_async::<i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| AppError::with_source(ErrorKind::Queue, "Redis LPUSH failed", e))
    }

    async fn consume(&self, cancel: CancellationToken) -> AppResult<MessageStream> {
        let timeout_seconds = self.block_timeout.as_secs().max(1);
        let reply_timeout = Duration::from_secs(timeout_seconds) + POP_REPLY_MARGIN;
        let state = PopLoop {
            conn: self.client.dedicated_connection(reply_timeout).await?,
            key: self.key.clone(),
            timeout_seconds,
            cancel,
        };
        let messages = stream::unfold(state, |mut state| async move {
            let message = state.next_message().await?;
            Some((message, state))
        });
        Ok(Box::pin(messages))
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client.ping().await
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use attendhub_core::config::redis::RedisConfig;
    use futures::StreamExt;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::Mutex;

    use super::*;

    type List = Arc<Mutex<VecDeque<Vec<u8>>>>;

    /// In-process RESP2 server holding a single list. Understands `PING`,
    /// `LPUSH` and `BRPOP`; answers `+OK` to anything else.
    async fn fake_redis() -> (String, List) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let list: List = Arc::default();
        let shared = Arc::clone(&list);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve_connection(socket, Arc::clone(&shared)));
            }
        });
        (format!("redis://{addr}"), list)
    }

    async fn read_command(reader: &mut BufReader<TcpStream>) -> Option<Vec<Vec<u8>>> {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;
        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
            let mut arg = vec![0; len + 2];
            reader.read_exact(&mut arg).await.ok()?;
            arg.truncate(len);
            args.push(arg);
        }
        Some(args)
    }

    async fn serve_connection(socket: TcpStream, list: List) {
        let mut reader = BufReader::new(socket);
        while let Some(args) = read_command(&mut reader).await {
            let name = String::from_utf8_lossy(&args[0]).to_ascii_uppercase();
            let reply = match name.as_str() {
                "PING" => b"+PONG\r\n".to_vec(),
                "LPUSH" => {
                    let mut list = list.lock().await;
                    for value in &args[2..] {
                        list.push_front(value.clone());
                    }
                    format!(":{}\r\n", list.len()).into_bytes()
                }
                "BRPOP" => blocking_pop(&args, &list).await,
                _ => b"+OK\r\n".to_vec(),
            };
            if reader.get_mut().write_all(&reply).await.is_err() {
                return;
            }
        }
    }

    async fn blocking_pop(args: &[Vec<u8>], list: &List) -> Vec<u8> {
        let key = &args[1];
        let seconds: u64 = String::from_utf8_lossy(&args[2]).parse().unwrap_or(0);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
        loop {
            if let Some(value) = list.lock().await.pop_back() {
                let mut reply = format!("*2\r\n${}\r\n", key.len()).into_bytes();
                reply.extend_from_slice(key);
                reply.extend_from_slice(format!("\r\n${}\r\n", value.len()).as_bytes());
                reply.extend_from_slice(&value);
                reply.extend_from_slice(b"\r\n");
                return reply;
            }
            if tokio::time::Instant::now() >= deadline {
                return b"*-1\r\n".to_vec();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    async fn queue_on(url: String, block_timeout: Duration) -> RedisQueue {
        let client = RedisClient::connect(&RedisConfig { url }).await.unwrap();
        RedisQueue::new(client, "attendance:checkins", block_timeout)
    }

    #[tokio::test]
    async fn test_publish_then_consume_in_order() {
        let (url, list) = fake_redis().await;
        let queue = queue_on(url, Duration::from_secs(1)).await;
        let cancel = CancellationToken::new();

        for id in ["evt-1", "evt-2", "evt-3"] {
            queue.publish(Message::checkin(id), &cancel).await.unwrap();
        }
        assert_eq!(list.lock().await.len(), 3);

        let mut stream = queue.consume(cancel).await.unwrap();
        for id in ["evt-1", "evt-2", "evt-3"] {
            let message = stream.next().await.unwrap();
            assert!(message.is_checkin());
            assert_eq!(message.body_str(), Some(id));
        }
    }

    #[tokio::test]
    async fn test_message_arriving_mid_pop_is_delivered() {
        let (url, _list) = fake_redis().await;
        let queue = queue_on(url, Duration::from_secs(5)).await;
        let mut stream = queue.consume(CancellationToken::new()).await.unwrap();

        let publisher = queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            publisher
                .publish(Message::checkin("evt-late"), &CancellationToken::new())
                .await
                .unwrap();
        });

        let message = tokio::time::timeout(Duration::from_secs(8), stream.next())
            .await
            .expect("popped message was not delivered")
            .unwrap();
        assert_eq!(message.body_str(), Some("evt-late"));
    }

    #[tokio::test]
    async fn test_consume_ends_after_cancel() {
        let (url, _list) = fake_redis().await;
        let queue = queue_on(url, Duration::from_secs(1)).await;
        let cancel = CancellationToken::new();
        let mut stream = queue.consume(cancel.clone()).await.unwrap();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let next = tokio::time::timeout(Duration::from_secs(4), stream.next())
            .await
            .unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_health_check_pings() {
        let (url, _list) = fake_redis().await;
        let queue = queue_on(url, Duration::from_secs(1)).await;
        assert!(queue.health_check().await.unwrap());
        assert_eq!(queue.backend_name(), "redis");
    }
}
