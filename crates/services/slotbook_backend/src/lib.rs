// File: services/slotbook_backend/src/lib.rs
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;
use serde::Serialize;
use slotbook_calendar::SlotCalendar;
use slotbook_config::AppConfig;
use slotbook_db::BookingRepository;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Everything the routes share: loaded once at startup, read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub calendar: Arc<SlotCalendar>,
    pub repository: Arc<dyn BookingRepository>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
}

#[axum::debug_handler]
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let storage = state.repository.backend_name();
    match state.repository.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                storage,
            }),
        ),
        Err(e) => {
            warn!("Health check failed for {} storage: {}", storage, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    storage,
                }),
            )
        }
    }
}

/// Assembles the full application: `/api` routes, tracing, CORS and, with the
/// `openapi` feature, Swagger UI at `/api/docs`.
pub fn build_router(state: AppState) -> Router {
    let core_router = Router::new()
        .route("/", get(|| async { "Welcome to the Slotbook API!" }))
        .route("/health", get(health_handler))
        .with_state(state.clone());

    let calendar_router = slotbook_calendar::routes(state.calendar.clone(), state.repository.clone());
    let bookings_router = slotbook_bookings::routes(
        state.calendar.clone(),
        state.repository.clone(),
        state.config.admin.clone(),
    );
    if state.config.admin.is_none() {
        info!("No reset code configured, DELETE /api/bookings is disabled");
    }

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest(
        "/api",
        core_router.merge(calendar_router).merge(bookings_router),
    );

    #[cfg(feature = "openapi")]
    {
        use slotbook_bookings::doc::BookingsApiDoc;
        use slotbook_calendar::doc::CalendarApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Slotbook API",
                version = "0.1.0",
                description = "Presentation slot booking service"
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(CalendarApiDoc::openapi());
        openapi_doc.merge(BookingsApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
