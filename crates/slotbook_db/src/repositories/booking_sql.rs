//! SQL implementation of the booking repository
//!
//! The `bookings` table keys rows by `code` and declares `slot` UNIQUE, so the database
//! itself refuses a second booking for a slot even when two requests race.

use crate::error::DbError;
use crate::repository::{BookingRepository, BoxFuture};
use crate::DbClient;
use chrono::{DateTime, SecondsFormat, Utc};
use slotbook_common::{Booking, BookingUpdate};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

// The Any driver cannot decode NULL into Option<String>, so optionals come back as ''.
const SELECT_COLUMNS: &str = "code, name, student_number, \
    COALESCE(company, '') AS company, COALESCE(notes, '') AS notes, \
    slot, created_at, updated_at";

/// SQL implementation of the booking repository
#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    db_client: DbClient,
}

impl SqlBookingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    // Fixed width, so lexical order is chronological order
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::QueryError(format!("Invalid timestamp '{}': {}", value, e)))
}

fn optional_text(row: &AnyRow, column: &str) -> Result<Option<String>, DbError> {
    let value: String = row.try_get(column)?;
    Ok((!value.is_empty()).then_some(value))
}

fn row_to_booking(row: &AnyRow) -> Result<Booking, DbError> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Booking {
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        student_number: row.try_get("student_number")?,
        company: optional_text(row, "company")?,
        notes: optional_text(row, "notes")?,
        slot: row.try_get("slot")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn map_insert_error(e: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return if db_err.message().contains("slot") {
                DbError::duplicate_slot()
            } else {
                DbError::duplicate_code()
            };
        }
    }
    error!("Failed to insert booking: {}", e);
    DbError::QueryError(e.to_string())
}

impl BookingRepository for SqlBookingRepository {
    fn backend_name(&self) -> &'static str {
        "database"
    }

    fn init(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing booking schema");

            let query = r#"
                CREATE TABLE IF NOT EXISTS bookings (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    student_number TEXT NOT NULL,
                    company TEXT,
                    notes TEXT,
                    slot TEXT NOT NULL UNIQUE,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
            "#;
            self.db_client.execute(query).await?;

            info!("Booking schema initialized successfully");
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, Vec<Booking>, DbError> {
        Box::pin(async move {
            let query = format!(
                "SELECT {} FROM bookings ORDER BY created_at ASC, code ASC",
                SELECT_COLUMNS
            );
            let rows = sqlx::query(&query)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to list bookings: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            rows.iter().map(row_to_booking).collect()
        })
    }

    fn get_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Option<Booking>, DbError> {
        Box::pin(async move {
            debug!("Finding booking by code");
            let query = format!("SELECT {} FROM bookings WHERE code = $1", SELECT_COLUMNS);
            let row = sqlx::query(&query)
                .bind(code)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to find booking: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            row.as_ref().map(row_to_booking).transpose()
        })
    }

    fn add(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError> {
        Box::pin(async move {
            debug!("Inserting booking for slot {}", booking.slot);
            let query = r#"
                INSERT INTO bookings (code, name, student_number, company, notes, slot, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#;
            sqlx::query(query)
                .bind(&booking.code)
                .bind(&booking.name)
                .bind(&booking.student_number)
                .bind(booking.company.clone())
                .bind(booking.notes.clone())
                .bind(&booking.slot)
                .bind(format_timestamp(&booking.created_at))
                .bind(format_timestamp(&booking.updated_at))
                .execute(self.db_client.pool())
                .await
                .map_err(map_insert_error)?;

            info!("Booking for slot {} stored", booking.slot);
            Ok(booking)
        })
    }

    fn update<'a>(
        &'a self,
        code: &'a str,
        update: BookingUpdate,
    ) -> BoxFuture<'a, Booking, DbError> {
        Box::pin(async move {
            let mut tx = self.db_client.pool().begin().await?;

            let select = format!("SELECT {} FROM bookings WHERE code = $1", SELECT_COLUMNS);
            let row = sqlx::query(&select)
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::NotFound(code.to_string()))?;
            let mut booking = row_to_booking(&row)?;
            booking.apply(&update, Utc::now());

            sqlx::query(
                "UPDATE bookings SET company = $1, notes = $2, updated_at = $3 WHERE code = $4",
            )
            .bind(booking.company.clone())
            .bind(booking.notes.clone())
            .bind(format_timestamp(&booking.updated_at))
            .bind(code)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to update booking: {}", e);
                DbError::QueryError(e.to_string())
            })?;

            tx.commit().await?;
            Ok(booking)
        })
    }

    fn delete<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Booking, DbError> {
        Box::pin(async move {
            let mut tx = self.db_client.pool().begin().await?;

            let select = format!("SELECT {} FROM bookings WHERE code = $1", SELECT_COLUMNS);
            let row = sqlx::query(&select)
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::NotFound(code.to_string()))?;
            let booking = row_to_booking(&row)?;

            sqlx::query("DELETE FROM bookings WHERE code = $1")
                .bind(code)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to delete booking: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            tx.commit().await?;
            info!("Booking for slot {} deleted", booking.slot);
            Ok(booking)
        })
    }

    fn reset_all(&self) -> BoxFuture<'_, u64, DbError> {
        Box::pin(async move {
            let removed = self.db_client.execute("DELETE FROM bookings").await?;
            info!("Removed {} bookings", removed);
            Ok(removed)
        })
    }

    fn health_check(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            if self.db_client.is_healthy().await {
                Ok(())
            } else {
                Err(DbError::PoolError("Database did not answer".to_string()))
            }
        })
    }

    fn close(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            self.db_client.close().await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::conformance;

    async fn sqlite_repository(dir: &tempfile::TempDir) -> SqlBookingRepository {
        let url = format!("sqlite://{}", dir.path().join("slotbook.db").display());
        SqlBookingRepository::new(DbClient::from_url(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_sql_repository_contract() {
        let dir = tempfile::tempdir().unwrap();
        let repo = sqlite_repository(&dir).await;
        conformance::exercise_repository(&repo).await;
        repo.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_optional_fields_round_trip_through_null() {
        let dir = tempfile::tempdir().unwrap();
        let repo = sqlite_repository(&dir).await;
        repo.init().await.unwrap();

        let mut booking = conformance::booking("7001", "2099-03-01 - 15:00");
        booking.notes = Some("bring HDMI".to_string());
        repo.add(booking.clone()).await.unwrap();

        let stored = repo.get_by_code("7001").await.unwrap().unwrap();
        assert_eq!(stored.company, None);
        assert_eq!(stored.notes.as_deref(), Some("bring HDMI"));
        assert_eq!(stored.created_at, booking.created_at);
    }

    #[tokio::test]
    async fn test_bookings_without_optionals_stay_readable() {
        let dir = tempfile::tempdir().unwrap();
        let repo = sqlite_repository(&dir).await;
        repo.init().await.unwrap();

        repo.add(conformance::booking("1111", "2099-03-01 - 10:10"))
            .await
            .unwrap();
        let mut with_company = conformance::booking("2222", "2099-03-01 - 10:35");
        with_company.company = Some("Acme".to_string());
        repo.add(with_company).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        let plain = repo.get_by_code("1111").await.unwrap().unwrap();
        assert_eq!(plain.company, None);
        assert_eq!(plain.notes, None);

        let updated = repo
            .update(
                "2222",
                BookingUpdate {
                    company: Some(String::new()),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.company, None, "empty string clears the field");
        assert_eq!(repo.get_by_code("2222").await.unwrap().unwrap().company, None);

        assert_eq!(repo.delete("1111").await.unwrap().code, "1111");
    }

    #[test]
    fn test_timestamps_keep_lexical_order() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
        assert_eq!(parse_timestamp(&format_timestamp(&earlier)).unwrap(), earlier);
    }
}
