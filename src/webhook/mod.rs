//! HTTP endpoint receiving Slack interactivity callbacks.
//!
//! Routes:
//! - `GET /` and `GET /health` for liveness probes.
//! - `POST /slack/events` for form submissions (see [`handler`]).

pub mod handler;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::GlobalConfig;
use crate::records::ResponseLog;
use crate::slack::client::SlackService;
use crate::storage::BinStorage;
use crate::{AppError, Result};

/// Shared state handed to every request.
///
/// Slack and storage are optional so the receiver can run without
/// outbound side effects; missing clients are logged and skipped.
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<GlobalConfig>,
    /// Flat-file records.
    pub records: ResponseLog,
    /// Slack client for acknowledgement and notification.
    pub slack: Option<Arc<SlackService>>,
    /// Bin-storage client for uploads.
    pub storage: Option<BinStorage>,
}

async fn hello() -> &'static str {
    "Hello, World!"
}

/// Handler for `GET /health`.
async fn health() -> &'static str {
    "ok"
}

/// Build the router with all webhook routes.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
        .route("/slack/events", post(handler::handle_interactivity))
        .with_state(state)
}

/// Bind `server.host:server.port` and serve until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the address cannot be bound, or
/// `AppError::Io` if the server fails while running.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind webhook on {bind}: {err}")))?;
    serve_on(listener, state, ct).await
}

/// Serve on an already-bound listener until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails while running.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    ct: CancellationToken,
) -> Result<()> {
    let addr = listener
        .local_addr()
        .map_err(|err| AppError::Io(format!("listener has no local address: {err}")))?;
    info!(%addr, "webhook receiver listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("webhook server error: {err}")))?;

    info!("webhook receiver shut down");
    Ok(())
}
