use deferred_hasher::{
    config::Config,
    core::{logging::init_structured_logging, shutdown::install_signal_handler},
    error::{AppError, Result},
    routes::{create_app, serve_until_drained},
    AppState,
};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = init_structured_logging() {
        eprintln!("💥 {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        error!(error = %e, "💥 Server terminated abnormally");
        std::process::exit(1);
    }

    info!("Server stopped");
}

async fn run() -> Result<()> {
    let config = Config::init()?;
    let address = config.address();
    let shutdown_timeout = config.shutdown_timeout();

    let state = AppState::new(config);
    let service = Arc::clone(&state.hash_service);
    let coordinator = Arc::clone(service.coordinator());

    install_signal_handler(Arc::clone(&coordinator), Arc::clone(service.store()));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::InternalFatal(format!("Could not listen on {}: {}", address, e)))?;

    info!("🚀 Server is ready to handle requests at {}", address);

    let app = create_app(state);
    serve_until_drained(listener, app, coordinator, shutdown_timeout).await
}
