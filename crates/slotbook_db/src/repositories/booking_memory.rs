//! In-process booking store
//!
//! Holds bookings in a vector behind an async lock. Contents live as long as the
//! repository value; nothing survives a restart.

use crate::error::DbError;
use crate::repository::{find_duplicate, BookingRepository, BoxFuture};
use chrono::Utc;
use slotbook_common::{Booking, BookingUpdate};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `bookings`, in the given order.
    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: RwLock::new(bookings),
        }
    }
}

impl BookingRepository for MemoryBookingRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn init(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async {
            info!("Using in-memory booking store");
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, Vec<Booking>, DbError> {
        Box::pin(async move { Ok(self.bookings.read().await.clone()) })
    }

    fn get_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Option<Booking>, DbError> {
        Box::pin(async move {
            let bookings = self.bookings.read().await;
            Ok(bookings.iter().find(|b| b.code == code).cloned())
        })
    }

    fn add(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError> {
        Box::pin(async move {
            let mut bookings = self.bookings.write().await;
            if let Some(err) = find_duplicate(&bookings, &booking) {
                debug!("Rejecting booking for slot {}: {}", booking.slot, err);
                return Err(err);
            }
            bookings.push(booking.clone());
            Ok(booking)
        })
    }

    fn update<'a>(
        &'a self,
        code: &'a str,
        update: BookingUpdate,
    ) -> BoxFuture<'a, Booking, DbError> {
        Box::pin(async move {
            let mut bookings = self.bookings.write().await;
            let booking = bookings
                .iter_mut()
                .find(|b| b.code == code)
                .ok_or_else(|| DbError::NotFound(code.to_string()))?;
            booking.apply(&update, Utc::now());
            Ok(booking.clone())
        })
    }

    fn delete<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Booking, DbError> {
        Box::pin(async move {
            let mut bookings = self.bookings.write().await;
            let index = bookings
                .iter()
                .position(|b| b.code == code)
                .ok_or_else(|| DbError::NotFound(code.to_string()))?;
            Ok(bookings.remove(index))
        })
    }

    fn reset_all(&self) -> BoxFuture<'_, u64, DbError> {
        Box::pin(async move {
            let mut bookings = self.bookings.write().await;
            let removed = bookings.len() as u64;
            bookings.clear();
            Ok(removed)
        })
    }

    fn health_check(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async { Ok(()) })
    }
}
