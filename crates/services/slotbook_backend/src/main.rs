// File: services/slotbook_backend/src/main.rs
use slotbook_backend::{build_router, shutdown_signal, AppState};
use slotbook_calendar::SlotCalendar;
use slotbook_common::{config_error, internal_error, log_error, log_result, SlotbookError};
use slotbook_config::{load_config, AppConfig};
use slotbook_db::create_repository;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            // No subscriber yet, so stderr is the only channel.
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = slotbook_common::init_from_config(&config.logging);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&e, "Server stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Arc<AppConfig>) -> Result<(), SlotbookError> {
    let calendar = Arc::new(SlotCalendar::from_config(&config.calendar)?);
    let repository = log_result(
        create_repository(&config).await,
        "Booking storage ready",
        "Failed to initialise booking storage",
    )?;
    info!("Using {} booking storage", repository.backend_name());

    let app = build_router(AppState {
        config: config.clone(),
        calendar,
        repository: repository.clone(),
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| config_error(format!("Cannot bind {}: {}", addr, e)))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(internal_error);

    // The store lives exactly as long as the process serves requests.
    repository.close().await?;
    info!("Booking storage closed");
    served
}
