// --- File: crates/slotbook_bookings/src/routes.rs ---

use crate::handlers::{
    cancel_booking_handler, create_booking_handler, get_booking_handler, list_bookings_handler,
    modify_booking_handler, reset_bookings_handler, BookingState,
};
use axum::{routing::get, Router};
use slotbook_calendar::SlotCalendar;
use slotbook_config::AdminConfig;
use slotbook_db::BookingRepository;
use std::sync::Arc;

/// Creates a router containing the booking lifecycle routes.
pub fn routes(
    calendar: Arc<SlotCalendar>,
    repository: Arc<dyn BookingRepository>,
    admin: Option<AdminConfig>,
) -> Router {
    let state = Arc::new(BookingState {
        calendar,
        repository,
        admin,
    });

    Router::new()
        .route(
            "/bookings",
            get(list_bookings_handler)
                .post(create_booking_handler)
                .delete(reset_bookings_handler),
        )
        .route(
            "/bookings/{code}",
            get(get_booking_handler)
                .patch(modify_booking_handler)
                .delete(cancel_booking_handler),
        )
        .with_state(state)
}
