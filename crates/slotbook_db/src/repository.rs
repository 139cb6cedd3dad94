//! The storage interface for bookings.
//!
//! Every backend implements [`BookingRepository`]; the service holds exactly one of them
//! as `Arc<dyn BookingRepository>`, chosen from configuration at startup.

use crate::error::DbError;
use slotbook_common::{Booking, BookingUpdate};
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Storage operations for bookings.
///
/// Implementations must refuse an `add` whose `slot` or `code` is already present with
/// [`DbError::Duplicate`], and must do the check and the insert atomically.
pub trait BookingRepository: Send + Sync {
    /// Short name of the backend, used in logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Prepare the store (create the table, the file, ...). Idempotent.
    fn init(&self) -> BoxFuture<'_, (), DbError>;

    /// All bookings, oldest first.
    fn list(&self) -> BoxFuture<'_, Vec<Booking>, DbError>;

    /// The booking holding `code`, if any.
    fn get_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Option<Booking>, DbError>;

    /// Insert a new booking.
    fn add(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError>;

    /// Apply a partial update; [`DbError::NotFound`] when `code` is unknown.
    fn update<'a>(
        &'a self,
        code: &'a str,
        update: BookingUpdate,
    ) -> BoxFuture<'a, Booking, DbError>;

    /// Remove and return the booking; [`DbError::NotFound`] when `code` is unknown.
    fn delete<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Booking, DbError>;

    /// Remove every booking and return how many were removed.
    fn reset_all(&self) -> BoxFuture<'_, u64, DbError>;

    /// Ok when the backend can serve requests.
    fn health_check(&self) -> BoxFuture<'_, (), DbError>;

    /// Release held resources at shutdown.
    fn close(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async { Ok(()) })
    }
}

/// Returns the duplicate error `booking` would cause against `existing`, if any.
pub(crate) fn find_duplicate(existing: &[Booking], booking: &Booking) -> Option<DbError> {
    if existing.iter().any(|b| b.slot == booking.slot) {
        Some(DbError::duplicate_slot())
    } else if existing.iter().any(|b| b.code == booking.code) {
        Some(DbError::duplicate_code())
    } else {
        None
    }
}
