// File: crates/slotbook_calendar/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{DaySlot, DaySlotsResponse, SlotsResponse};
use crate::logic::TimeSlot;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_slots_handler,
        crate::handlers::get_day_slots_handler
    ),
    components(
        schemas(TimeSlot, SlotsResponse, DaySlot, DaySlotsResponse)
    ),
    tags(
        (name = "Slots", description = "Presentation slot calendar")
    ),
    servers(
        (url = "/api", description = "Slotbook API server")
    )
)]
pub struct CalendarApiDoc;
