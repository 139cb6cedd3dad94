//! Booking store backends
//!
//! One implementation of [`crate::BookingRepository`] per storage medium.

pub mod booking_file;
pub mod booking_memory;
pub mod booking_sql;
#[cfg(test)]
pub(crate) mod conformance;

pub use booking_file::FileBookingRepository;
pub use booking_memory::MemoryBookingRepository;
pub use booking_sql::SqlBookingRepository;
