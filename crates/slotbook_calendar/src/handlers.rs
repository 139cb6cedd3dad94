// File: crates/slotbook_calendar/src/handlers.rs
use crate::logic::{
    annotate_availability, available_slots_count, format_short_date, format_slot_display,
    format_time_range, generate_time_slots, is_presentation_date, next_available_slot, parse_date, SlotCalendar,
    TimeSlot,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use slotbook_common::{not_found, validation_error, Booking, SlotbookError};
use slotbook_db::BookingRepository;
use std::sync::Arc;
use tracing::{debug, info};

// Shared state needed by the calendar handlers
#[derive(Clone)]
pub struct CalendarState {
    pub calendar: Arc<SlotCalendar>,
    pub repository: Arc<dyn BookingRepository>,
}

/// All slots with their current availability.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub slots: Vec<TimeSlot>,
    /// Keys (`YYYY-MM-DD - HH:mm`) of every booked slot.
    pub booked_slots: Vec<String>,
    pub available_count: usize,
    pub next_available: Option<TimeSlot>,
}

/// A slot of one day, with human-readable labels.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlot {
    #[serde(flatten)]
    pub slot: TimeSlot,
    #[cfg_attr(feature = "openapi", schema(example = "10.10 am - 10.30 am"))]
    pub time_range: String,
    #[cfg_attr(feature = "openapi", schema(example = "Sunday, February 2, 2025 - 10:10"))]
    pub display: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotsResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-02-02"))]
    pub date: chrono::NaiveDate,
    /// Short label for a day picker.
    #[cfg_attr(feature = "openapi", schema(example = "Sun, Feb 2"))]
    pub label: String,
    pub slots: Vec<DaySlot>,
    pub available_count: usize,
}

async fn current_slots(state: &CalendarState) -> Result<(Vec<TimeSlot>, Vec<Booking>), SlotbookError> {
    let bookings = state.repository.list().await?;
    let now = state.calendar.now();
    let slots = annotate_availability(generate_time_slots(&state.calendar), &bookings, now);
    Ok((slots, bookings))
}

/// Handler to list every slot with availability.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/slots",
    responses(
        (status = 200, description = "All presentation slots with availability", body = SlotsResponse),
        (status = 500, description = "Storage error")
    ),
    tag = "Slots"
))]
pub async fn get_slots_handler(
    State(state): State<Arc<CalendarState>>,
) -> Result<Json<SlotsResponse>, SlotbookError> {
    let (slots, bookings) = current_slots(&state).await?;
    let now = state.calendar.now();

    let response = SlotsResponse {
        available_count: available_slots_count(&slots, now),
        next_available: next_available_slot(&slots, now).cloned(),
        booked_slots: bookings.into_iter().map(|b| b.slot).collect(),
        slots,
    };
    debug!(
        "Serving {} slots, {} available",
        response.slots.len(),
        response.available_count
    );
    Ok(Json(response))
}

/// Handler to list the slots of one presentation date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/slots/{date}",
    params(
        ("date" = String, Path, description = "Presentation date in YYYY-MM-DD format", example = "2025-02-02")
    ),
    responses(
        (status = 200, description = "Slots of the day", body = DaySlotsResponse),
        (status = 400, description = "Malformed date"),
        (status = 404, description = "Not a presentation date")
    ),
    tag = "Slots"
))]
pub async fn get_day_slots_handler(
    State(state): State<Arc<CalendarState>>,
    Path(date): Path<String>,
) -> Result<Json<DaySlotsResponse>, SlotbookError> {
    let date = parse_date(&date).map_err(validation_error)?;
    if !is_presentation_date(&state.calendar, date) {
        info!("Slots requested for non-presentation date {}", date);
        return Err(not_found(format!("{} is not a presentation date", date)));
    }

    let (slots, _) = current_slots(&state).await?;
    let now = state.calendar.now();
    let day: Vec<TimeSlot> = slots.into_iter().filter(|s| s.date == date).collect();

    Ok(Json(DaySlotsResponse {
        date,
        label: format_short_date(date),
        available_count: available_slots_count(&day, now),
        slots: day
            .into_iter()
            .map(|slot| DaySlot {
                time_range: format_time_range(slot.start_time, slot.end_time),
                display: format_slot_display(&slot),
                slot,
            })
            .collect(),
    }))
}
