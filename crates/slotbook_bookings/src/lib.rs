// --- File: crates/slotbook_bookings/src/lib.rs ---
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;

pub use logic::{
    cancel_booking, create_booking, generate_booking_code, get_booking, is_valid_booking_code,
    list_bookings, modify_booking, reset_all_bookings, validate_booking_request, BookingError,
    CreateBookingRequest, PublicBooking,
};
pub use routes::routes;
