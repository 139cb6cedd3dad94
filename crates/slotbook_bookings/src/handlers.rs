// File: crates/slotbook_bookings/src/handlers.rs
use crate::logic::{
    cancel_booking, create_booking, get_booking, list_bookings, modify_booking,
    reset_all_bookings, BookingListResponse, BookingResponse, CancellationResponse,
    CreateBookingRequest, CreateBookingResponse, ResetQuery, ResetResponse,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use slotbook_calendar::SlotCalendar;
use slotbook_common::{map_json_error, validation_error, BookingUpdate, SlotbookError};
use slotbook_config::AdminConfig;
use slotbook_db::BookingRepository;
use std::sync::Arc;
use tracing::{debug, info};

// Shared state needed by the booking handlers
#[derive(Clone)]
pub struct BookingState {
    pub calendar: Arc<SlotCalendar>,
    pub repository: Arc<dyn BookingRepository>,
    /// `None` disables the reset endpoint.
    pub admin: Option<AdminConfig>,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, SlotbookError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        debug!("Rejected request body: {}", rejection);
        validation_error(format!("Invalid request body: {}", rejection.body_text()))
    })
}

/// Handler to book a slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Slot booked; the response carries the booking code", body = CreateBookingResponse),
        (status = 400, description = "Invalid fields, unknown or past slot"),
        (status = 409, description = "Slot already booked"),
        (status = 500, description = "Storage error")
    ),
    tag = "Bookings"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), SlotbookError> {
    let request = json_body(body)?;
    let booking = create_booking(
        state.repository.as_ref(),
        &state.calendar,
        request,
        state.calendar.now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            success: true,
            code: booking.code.clone(),
            booking,
        }),
    ))
}

/// Handler to look up a booking by its code.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings/{code}",
    params(
        ("code" = String, Path, description = "4-digit booking code", example = "4821")
    ),
    responses(
        (status = 200, description = "The booking", body = BookingResponse),
        (status = 400, description = "Malformed code"),
        (status = 404, description = "No booking with this code")
    ),
    tag = "Bookings"
))]
pub async fn get_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(code): Path<String>,
) -> Result<Json<BookingResponse>, Response> {
    let result = get_booking(state.repository.as_ref(), &code)
        .await
        .map(|booking| BookingResponse {
            success: true,
            booking,
        });
    map_json_error(result, SlotbookError::from)
}

/// Handler to change company and notes of a booking.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/bookings/{code}",
    params(
        ("code" = String, Path, description = "4-digit booking code", example = "4821")
    ),
    request_body = BookingUpdate,
    responses(
        (status = 200, description = "Updated booking", body = BookingResponse),
        (status = 400, description = "Invalid fields or presentation day reached"),
        (status = 404, description = "No booking with this code")
    ),
    tag = "Bookings"
))]
pub async fn modify_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(code): Path<String>,
    body: Result<Json<BookingUpdate>, JsonRejection>,
) -> Result<Json<BookingResponse>, SlotbookError> {
    let update = json_body(body)?;
    let booking = modify_booking(
        state.repository.as_ref(),
        &code,
        update,
        state.calendar.today(),
    )
    .await?;
    Ok(Json(BookingResponse {
        success: true,
        booking,
    }))
}

/// Handler to cancel a booking, freeing its slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/bookings/{code}",
    params(
        ("code" = String, Path, description = "4-digit booking code", example = "4821")
    ),
    responses(
        (status = 200, description = "Booking cancelled", body = CancellationResponse),
        (status = 400, description = "Malformed code or presentation day reached"),
        (status = 404, description = "No booking with this code")
    ),
    tag = "Bookings"
))]
pub async fn cancel_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(code): Path<String>,
) -> Result<Json<CancellationResponse>, SlotbookError> {
    let removed = cancel_booking(state.repository.as_ref(), &code, state.calendar.today()).await?;
    Ok(Json(CancellationResponse {
        success: true,
        message: format!("Booking for {} cancelled", removed.slot),
    }))
}

/// Handler to list booked slots without codes or notes.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings",
    responses(
        (status = 200, description = "Public view of all bookings", body = BookingListResponse)
    ),
    tag = "Bookings"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<BookingListResponse>, SlotbookError> {
    let bookings = list_bookings(state.repository.as_ref()).await?;
    Ok(Json(BookingListResponse { bookings }))
}

/// Handler to remove every booking (administrative).
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/bookings",
    params(ResetQuery),
    responses(
        (status = 200, description = "All bookings removed", body = ResetResponse),
        (status = 401, description = "Wrong or missing reset code"),
        (status = 500, description = "Reset not configured")
    ),
    tag = "Admin"
))]
pub async fn reset_bookings_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<ResetResponse>, SlotbookError> {
    let supplied = query.reset_code.unwrap_or_default();
    let removed =
        reset_all_bookings(state.repository.as_ref(), state.admin.as_ref(), &supplied).await?;
    info!("Reset endpoint removed {} bookings", removed);
    Ok(Json(ResetResponse {
        success: true,
        removed,
    }))
}
