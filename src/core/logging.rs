use axum::{body::Body, http::Request};
use tracing::{info, Span};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Initialize structured logging system
pub fn init_structured_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NONE)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::InternalFatal(format!("Failed to initialize logging: {}", e)))?;

    info!("📝 Structured logging initialized");
    Ok(())
}

/// Span for one HTTP request, tagged with a fresh request id
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        uri = %request.uri(),
    )
}
