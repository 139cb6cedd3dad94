//! Booking storage for slotbook
//!
//! One storage interface, [`BookingRepository`], with three interchangeable backends:
//!
//! - [`MemoryBookingRepository`]: process memory, lost on restart
//! - [`FileBookingRepository`]: a single JSON document on disk
//! - [`SqlBookingRepository`]: SQLx `Any` pool (SQLite by default, PostgreSQL via feature)
//!
//! A deployment picks exactly one through `[storage] backend` and [`create_repository`].
//!
//! ```rust,no_run
//! use slotbook_config::AppConfig;
//! use slotbook_db::create_repository;
//!
//! async fn setup() -> Result<(), slotbook_db::DbError> {
//!     let repository = create_repository(&AppConfig::default()).await?;
//!     println!("{} bookings", repository.list().await?.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use factory::create_repository;
pub use repositories::{FileBookingRepository, MemoryBookingRepository, SqlBookingRepository};
pub use repository::{BookingRepository, BoxFuture};
