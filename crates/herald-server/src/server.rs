//! `HeraldServer`: router assembly and the listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use herald_hub::HubHandle;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::errors::ServerError;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::{ingest, metrics, stream};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Submission side of the hub.
    pub hub: HubHandle,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle for `/metrics`.
    pub metrics: PrometheusHandle,
}

/// The herald HTTP server.
pub struct HeraldServer {
    config: ServerConfig,
    hub: HubHandle,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: PrometheusHandle,
}

impl HeraldServer {
    /// Create a server that publishes into `hub`.
    ///
    /// The hub loop is run by the caller, normally with
    /// `self.shutdown().token()` so one shutdown stops both.
    pub fn new(config: ServerConfig, hub: HubHandle, metrics: PrometheusHandle) -> Self {
        Self {
            config,
            hub,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics,
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            hub: self.hub.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        let mut router = Router::new()
            .route("/events", get(stream::events_handler))
            .route("/send-notification", post(ingest::send_notification))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler));
        if let Some(dir) = &self.config.static_dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        router
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// Returns the bound address (useful with port 0) and the serve task.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "herald server listening");

        let router = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                error!(%error, "server terminated with error");
            }
            info!("herald server stopped");
        });
        Ok((local_addr, handle))
    }

    /// The hub this server publishes into.
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, state.hub.client_count()))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    metrics::render(&state.metrics)
}
