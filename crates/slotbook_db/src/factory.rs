//! Builds the one booking store a deployment uses.

use crate::client::DbClient;
use crate::error::DbError;
use crate::repositories::{FileBookingRepository, MemoryBookingRepository, SqlBookingRepository};
use crate::repository::BookingRepository;
use slotbook_config::{AppConfig, StorageBackend};
use std::sync::Arc;
use tracing::info;

/// Create and initialise the booking store selected by `[storage] backend`.
///
/// # Errors
///
/// * `backend = "database"` without a `[database]` section
/// * the store cannot be initialised (unwritable file, unreachable database)
pub async fn create_repository(config: &AppConfig) -> Result<Arc<dyn BookingRepository>, DbError> {
    let repository: Arc<dyn BookingRepository> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryBookingRepository::new()),
        StorageBackend::File => {
            Arc::new(FileBookingRepository::new(&config.storage.file_path))
        }
        StorageBackend::Database => {
            let client = DbClient::new(config).await?;
            Arc::new(SqlBookingRepository::new(client))
        }
    };

    repository.init().await?;
    info!("Booking store ready ({})", repository.backend_name());
    Ok(repository)
}
