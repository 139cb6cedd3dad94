//! JSON file booking store
//!
//! Keeps all bookings in one pretty-printed document of the form
//! `{ "bookings": [ ... ] }`. Every mutation reads, changes and rewrites the whole
//! file while holding a lock, so writers never interleave within this process.

use crate::error::DbError;
use crate::repository::{find_duplicate, BookingRepository, BoxFuture};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use slotbook_common::{Booking, BookingUpdate};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct BookingsDocument {
    #[serde(default)]
    bookings: Vec<Booking>,
}

#[derive(Debug)]
pub struct FileBookingRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBookingRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_file(&self) -> Result<(), DbError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await?;
            }
        }
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        debug!("Creating empty bookings file at {}", self.path.display());
        self.write(&BookingsDocument::default()).await
    }

    /// A missing or empty file reads as an empty document.
    async fn read(&self) -> Result<BookingsDocument, DbError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BookingsDocument::default()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                error!("Bookings file {} is corrupt: {}", self.path.display(), e);
                DbError::SerializationError(e)
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(BookingsDocument::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, document: &BookingsDocument) -> Result<(), DbError> {
        let json = serde_json::to_string_pretty(document)?;
        // Sibling file then rename; readers never see a partial document.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl BookingRepository for FileBookingRepository {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    fn init(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            self.ensure_file().await?;
            info!("Using booking file {}", self.path.display());
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, Vec<Booking>, DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            Ok(self.read().await?.bookings)
        })
    }

    fn get_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Option<Booking>, DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let document = self.read().await?;
            Ok(document.bookings.into_iter().find(|b| b.code == code))
        })
    }

    fn add(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let mut document = self.read().await?;
            if let Some(err) = find_duplicate(&document.bookings, &booking) {
                debug!("Rejecting booking for slot {}: {}", booking.slot, err);
                return Err(err);
            }
            document.bookings.push(booking.clone());
            self.write(&document).await?;
            Ok(booking)
        })
    }

    fn update<'a>(
        &'a self,
        code: &'a str,
        update: BookingUpdate,
    ) -> BoxFuture<'a, Booking, DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let mut document = self.read().await?;
            let booking = document
                .bookings
                .iter_mut()
                .find(|b| b.code == code)
                .ok_or_else(|| DbError::NotFound(code.to_string()))?;
            booking.apply(&update, Utc::now());
            let updated = booking.clone();
            self.write(&document).await?;
            Ok(updated)
        })
    }

    fn delete<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Booking, DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let mut document = self.read().await?;
            let index = document
                .bookings
                .iter()
                .position(|b| b.code == code)
                .ok_or_else(|| DbError::NotFound(code.to_string()))?;
            let removed = document.bookings.remove(index);
            self.write(&document).await?;
            Ok(removed)
        })
    }

    fn reset_all(&self) -> BoxFuture<'_, u64, DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let removed = self.read().await?.bookings.len() as u64;
            self.write(&BookingsDocument::default()).await?;
            Ok(removed)
        })
    }

    fn health_check(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            self.read().await.map(|_| ())
        })
    }
}
