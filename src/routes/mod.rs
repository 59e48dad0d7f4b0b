// Builds the HTTP surface: the hash routes plus the tracing and timeout layers

use crate::{
    core::{logging::request_span, ShutdownCoordinator},
    error::{AppError, Result},
    handlers::{get_hash, get_stats, index, method_not_allowed, shutdown, submit_hash},
    AppState,
};
use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

type ServerTask = JoinHandle<std::io::Result<()>>;

/// Routes without middleware. Wrong methods on known paths answer 405.
pub fn hash_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).fallback(method_not_allowed))
        .route("/hash", post(submit_hash).fallback(method_not_allowed))
        .route("/hash/:id", get(get_hash).fallback(method_not_allowed))
        .route("/stats", get(get_stats).fallback(method_not_allowed))
        .route("/shutdown", get(shutdown).fallback(method_not_allowed))
        .fallback(route_not_found)
}

/// Full application: routes, state and middleware layers
pub fn create_app(state: AppState) -> Router {
    let request_timeout = state.env.request_timeout();

    hash_router()
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route not found: {}", uri.path()))
}

/// Serve `app` until a drain is requested, then wait for every pending job
/// before letting the listener finish within `shutdown_timeout`.
pub async fn serve_until_drained(
    listener: TcpListener,
    app: Router,
    coordinator: Arc<ShutdownCoordinator>,
    shutdown_timeout: Duration,
) -> Result<()> {
    let drain_signal = Arc::clone(&coordinator);
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { drain_signal.drain_requested().await })
            .await
    });

    wait_until_drained(server, coordinator, shutdown_timeout).await
}

/// The listener stopping on its own is fatal unless a drain was requested.
/// A drain request always waits for `drained()` first.
pub(crate) async fn wait_until_drained(
    mut server: ServerTask,
    coordinator: Arc<ShutdownCoordinator>,
    shutdown_timeout: Duration,
) -> Result<()> {
    let finished = tokio::select! {
        biased;
        _ = coordinator.drain_requested() => None,
        result = &mut server => {
            if !coordinator.is_draining() {
                return Err(AppError::InternalFatal(format!(
                    "Server exited before shutdown was requested: {:?}",
                    result
                )));
            }
            Some(result)
        }
    };

    info!("Server is shutting down, waiting for pending jobs");
    coordinator.drained().await;
    info!("All jobs finished, stopping listener");

    let result = match finished {
        Some(result) => result,
        None => tokio::time::timeout(shutdown_timeout, server)
            .await
            .map_err(|_| {
                AppError::InternalFatal(format!(
                    "Could not gracefully shutdown the server within {:?}",
                    shutdown_timeout
                ))
            })?,
    };

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::InternalFatal(format!("Server error: {}", e))),
        Err(e) => Err(AppError::InternalFatal(format!("Server task failed: {}", e))),
    }
}
