// --- File: crates/slotbook_calendar/src/lib.rs ---
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod logic_test;
pub mod routes;

pub use logic::{
    can_manage_booking, format_slot_key, generate_time_slots, is_slot_available, resolve_slot,
    validate_slot_timing, CalendarError, SlotCalendar, TimeSlot,
};
pub use routes::routes;
