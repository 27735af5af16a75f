//! Application builder: wires store, queue, services, worker, router and
//! middleware into a runnable server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use attendhub_auth::jwt::{JwtDecoder, JwtEncoder};
use attendhub_auth::rate_limit::RateLimiter;
use attendhub_core::config::AppConfig;
use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;
use attendhub_core::traits::clock::{Clock, SystemClock};
use attendhub_core::traits::queue::MessageQueue;
use attendhub_database::store::{EventStore, connect_event_store};
use attendhub_queue::QueueManager;
use attendhub_service::checkin::CheckinService;
use attendhub_service::session::DeviceSessionService;
use attendhub_worker::processor::CheckinProcessor;
use attendhub_worker::runner::WorkerRunner;
use attendhub_worker::verifier::{FaceVerifier, build_verifier};

use crate::metrics::MetricsHandle;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::middleware::security_headers::security_headers;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(security_headers))
}

/// The composition root. Owns every long-lived component.
#[derive(Debug)]
pub struct Application {
    state: AppState,
    worker: Option<WorkerRunner>,
}

impl Application {
    /// Connect to the configured backends and assemble the application.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        info!(provider = %config.database.provider, "Connecting event store...");
        let store = connect_event_store(&config.database).await?;

        info!(backend = %config.queue.backend, "Initializing queue...");
        let queue: Arc<dyn MessageQueue> = Arc::new(QueueManager::new(&config).await?);

        let verifier = build_verifier(&config.face)?;

        Self::from_parts(config, store, queue, verifier, Arc::new(SystemClock))
    }

    /// Assemble the application from already-constructed backends.
    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn EventStore>,
        queue: Arc<dyn MessageQueue>,
        verifier: Arc<dyn FaceVerifier>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let config = Arc::new(config);

        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth, Arc::clone(&clock)));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&clock)));
        let rate_limiter = Arc::new(RateLimiter::from_config(
            &config.rate_limit,
            Arc::clone(&clock),
        ));

        let checkin_service = Arc::new(CheckinService::from_config(
            Arc::clone(&store),
            Arc::clone(&clock),
            &config.checkin,
        )?);
        let session_service = Arc::new(DeviceSessionService::new(
            Arc::clone(&checkin_service),
            Arc::clone(&store),
            jwt_encoder,
            Arc::clone(&jwt_decoder),
            Arc::clone(&clock),
        ));

        let worker = config.worker.enabled.then(|| {
            let processor = Arc::new(CheckinProcessor::new(Arc::clone(&store), verifier));
            WorkerRunner::new(Arc::clone(&queue), processor, config.worker.clone())
        });

        let metrics = if config.metrics.enabled {
            MetricsHandle::install()
        } else {
            None
        };

        let state = AppState {
            config,
            store,
            queue,
            jwt_decoder,
            rate_limiter,
            checkin_service,
            session_service,
            metrics,
            shutdown: CancellationToken::new(),
        };

        Ok(Self { state, worker })
    }

    /// Shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Token cancelled on shutdown. Cancelling it stops the server and worker.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    /// Start the embedded worker, if enabled.
    pub fn spawn_worker(&self) -> Option<JoinHandle<AppResult<u64>>> {
        let worker = self.worker.clone()?;
        let cancel = self.state.shutdown.clone();
        Some(tokio::spawn(async move { worker.run(cancel).await }))
    }

    /// Bind the configured address and serve until `signal` resolves.
    pub async fn run(self, signal: impl Future<Output = ()> + Send + 'static) -> AppResult<()> {
        let addr = self.state.config.server.bind_address();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, format!("Failed to bind {addr}"), e)
        })?;
        info!(%addr, "AttendHub server listening");
        self.serve(listener, signal).await
    }

    /// Serve on `listener` with the embedded worker until `signal` resolves.
    ///
    /// In-flight requests and the worker each get
    /// `server.shutdown_grace_seconds` to finish before being abandoned.
    pub async fn serve(
        self,
        listener: TcpListener,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> AppResult<()> {
        let shutdown = self.state.shutdown.clone();
        let grace = Duration::from_secs(self.state.config.server.shutdown_grace_seconds);

        watch_signal(signal, shutdown.clone());
        let worker = self.spawn_worker();

        let app = self.router();
        let server = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        });
        let mut server_task = tokio::spawn(async move { server.await });

        let served = tokio::select! {
            joined = &mut server_task => {
                shutdown.cancel();
                server_result(joined)
            }
            _ = shutdown.cancelled() => {
                info!(grace_seconds = grace.as_secs(), "Draining in-flight requests");
                match tokio::time::timeout(grace, &mut server_task).await {
                    Ok(joined) => server_result(joined),
                    Err(_) => {
                        warn!("Grace period elapsed, abandoning open connections");
                        server_task.abort();
                        Ok(())
                    }
                }
            }
        };

        if let Some(handle) = worker {
            await_worker(handle, grace).await;
        }

        info!("AttendHub server stopped");
        served
    }

    /// Run only the worker until `signal` resolves. Returns the number of
    /// messages handled.
    pub async fn run_worker(
        self,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> AppResult<u64> {
        let worker = self
            .worker
            .ok_or_else(|| AppError::configuration("worker.enabled is false"))?;
        let shutdown = self.state.shutdown.clone();
        watch_signal(signal, shutdown.clone());
        worker.run(shutdown).await
    }
}

/// Cancel `shutdown` once `signal` resolves.
fn watch_signal(signal: impl Future<Output = ()> + Send + 'static, shutdown: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = signal => shutdown.cancel(),
            _ = shutdown.cancelled() => {}
        }
    });
}

fn server_result(joined: Result<std::io::Result<()>, JoinError>) -> AppResult<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::with_source(ErrorKind::Internal, "HTTP server error", e)),
        Err(e) => Err(AppError::with_source(ErrorKind::Internal, "HTTP server task failed", e)),
    }
}

async fn await_worker(mut handle: JoinHandle<AppResult<u64>>, grace: Duration) {
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(Ok(Ok(handled))) => info!(handled, "Worker drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "Worker exited with error"),
        Ok(Err(e)) => error!(error = %e, "Worker task failed"),
        Err(_) => {
            warn!("Worker did not stop within the grace period, dropping it");
            handle.abort();
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendhub_core::config::database::PROVIDER_MEMORY;
    use attendhub_core::config::queue::BACKEND_MEMORY;
    use attendhub_database::store::MemoryEventStore;
    use attendhub_queue::memory::MemoryQueue;
    use attendhub_worker::verifier::FixtureFaceVerifier;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.provider = PROVIDER_MEMORY.to_string();
        config.queue.backend = BACKEND_MEMORY.to_string();
        config.server.shutdown_grace_seconds = 1;
        config
    }

    #[tokio::test]
    async fn test_build_memory_application() {
        let app = Application::build(memory_config()).await.unwrap();
        assert_eq!(app.state().store.backend_name(), "memory");
        assert_eq!(app.state().queue.backend_name(), "memory");
        assert!(app.worker.is_some());
    }

    #[tokio::test]
    async fn test_serve_stops_on_signal() {
        let app = Application::from_parts(
            memory_config(),
            Arc::new(MemoryEventStore::new()),
            Arc::new(MemoryQueue::new(4)),
            Arc::new(FixtureFaceVerifier::new(0.95)),
            Arc::new(SystemClock),
        )
        .unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let result = app
            .serve(listener, tokio::time::sleep(Duration::from_millis(50)))
            .await;
        assert!(result.is_ok());
    }
}
