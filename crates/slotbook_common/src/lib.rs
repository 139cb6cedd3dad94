// --- File: crates/slotbook_common/src/lib.rs ---

pub mod error; // Error taxonomy and status codes
pub mod http; // HTTP error rendering
pub mod logging; // Logging utilities
pub mod models; // Shared data structures

pub use error::{
    config_error, conflict, internal_error, not_found, validation_error, HttpStatusCode,
    SlotbookError,
};

pub use http::{map_json_error, IntoHttpResponse};

pub use logging::{init, init_from_config, init_with_level, log_error, log_result};

pub use models::{Booking, BookingUpdate};
