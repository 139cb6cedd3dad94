// --- File: crates/slotbook_calendar/src/routes.rs ---

use crate::handlers::{get_day_slots_handler, get_slots_handler, CalendarState};
use crate::logic::SlotCalendar;
use axum::{routing::get, Router};
use slotbook_db::BookingRepository;
use std::sync::Arc;

/// Creates a router containing the slot listing routes.
pub fn routes(calendar: Arc<SlotCalendar>, repository: Arc<dyn BookingRepository>) -> Router {
    let state = Arc::new(CalendarState {
        calendar,
        repository,
    });

    Router::new()
        .route("/slots", get(get_slots_handler))
        .route("/slots/{date}", get(get_day_slots_handler))
        .with_state(state)
}
