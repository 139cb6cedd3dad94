// --- File: crates/slotbook_bookings/src/logic.rs ---
use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use slotbook_calendar::logic::{
    can_manage_booking, is_slot_available, is_slot_in_past, parse_slot_key, resolve_slot,
    CalendarError, SlotCalendar,
};
use slotbook_common::{Booking, BookingUpdate, HttpStatusCode, SlotbookError};
use slotbook_config::AdminConfig;
use slotbook_db::{BookingRepository, DbError};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const BOOKING_CODE_LENGTH: usize = 4;
pub const STUDENT_NUMBER_LENGTH: usize = 8;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NOTES_LENGTH: usize = 20;
/// Draws before giving up on finding an unused code.
const MAX_CODE_ATTEMPTS: usize = 20;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid booking code format")]
    InvalidCode,
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("This slot is no longer available")]
    SlotInPast,
    #[error("{0}")]
    Conflict(String),
    #[error("Booking not found")]
    NotFound,
    #[error("Bookings can only be changed or cancelled before the presentation day")]
    ManagementClosed,
    #[error("Invalid reset code")]
    InvalidResetCode,
    #[error("Reset is not configured on this server")]
    ResetNotConfigured,
    #[error("Could not allocate a unique booking code")]
    CodeSpaceExhausted,
    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl From<DbError> for BookingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => BookingError::NotFound,
            DbError::Duplicate(message) => BookingError::Conflict(message),
            other => BookingError::Storage(other),
        }
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Validation(_)
            | BookingError::InvalidCode
            | BookingError::Calendar(_)
            | BookingError::SlotInPast
            | BookingError::ManagementClosed => 400,
            BookingError::InvalidResetCode => 401,
            BookingError::NotFound => 404,
            BookingError::Conflict(_) => 409,
            BookingError::ResetNotConfigured
            | BookingError::CodeSpaceExhausted
            | BookingError::Storage(_) => 500,
        }
    }
}

impl From<BookingError> for SlotbookError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::InvalidResetCode => SlotbookError::AuthError(message),
            BookingError::NotFound => SlotbookError::NotFoundError(message),
            BookingError::Conflict(_) => SlotbookError::ConflictError(message),
            BookingError::ResetNotConfigured => SlotbookError::ConfigError(message),
            BookingError::CodeSpaceExhausted => SlotbookError::InternalError(message),
            BookingError::Storage(db) => db.into(),
            _ => SlotbookError::ValidationError(message),
        }
    }
}

// --- Request & Response Structures ---

/// Body of `POST /bookings`.
///
/// Every field defaults to empty so missing fields surface as a validation error
/// naming them rather than as a deserialization failure.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookingRequest {
    #[cfg_attr(feature = "openapi", schema(example = "Ada Lovelace"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "20251234"))]
    pub student_number: String,
    pub company: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "Needs HDMI"))]
    pub notes: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "2025-02-02 - 10:10"))]
    pub slot: String,
}

impl CreateBookingRequest {
    /// Trims every field; blank optionals become `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            student_number: self.student_number.trim().to_string(),
            company: trim_optional(self.company),
            notes: trim_optional(self.notes),
            slot: self.slot.trim().to_string(),
        }
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub success: bool,
    /// The credential needed to look up, modify or cancel the booking.
    #[cfg_attr(feature = "openapi", schema(example = "4821"))]
    pub code: String,
    pub booking: Booking,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub booking: Booking,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetQuery {
    pub reset_code: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    pub removed: u64,
}

/// What anyone may see about a booking: never the code, never the notes.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicBooking {
    pub slot: String,
    pub name: String,
    pub student_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl From<Booking> for PublicBooking {
    fn from(booking: Booking) -> Self {
        Self {
            slot: booking.slot,
            name: booking.name,
            student_number: booking.student_number,
            company: booking.company,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub bookings: Vec<PublicBooking>,
}

// --- Codes ---

/// A uniformly drawn code in `1000..=9999`.
pub fn generate_booking_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

/// Exactly four ASCII digits.
pub fn is_valid_booking_code(code: &str) -> bool {
    code.len() == BOOKING_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

fn allocate_booking_code(taken: &HashSet<&str>) -> Result<String, BookingError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_booking_code();
        if !taken.contains(code.as_str()) {
            return Ok(code);
        }
    }
    warn!(
        "No free booking code after {} attempts ({} in use)",
        MAX_CODE_ATTEMPTS,
        taken.len()
    );
    Err(BookingError::CodeSpaceExhausted)
}

fn ensure_valid_code(code: &str) -> Result<(), BookingError> {
    if is_valid_booking_code(code) {
        Ok(())
    } else {
        Err(BookingError::InvalidCode)
    }
}

// --- Validation ---

/// Checks the booking form fields. Expects a normalized request.
pub fn validate_booking_request(request: &CreateBookingRequest) -> Result<(), BookingError> {
    let missing: Vec<&str> = [
        ("name", request.name.is_empty()),
        ("studentNumber", request.student_number.is_empty()),
        ("slot", request.slot.is_empty()),
    ]
    .iter()
    .filter(|(_, is_missing)| *is_missing)
    .map(|(field, _)| *field)
    .collect();
    if !missing.is_empty() {
        return Err(BookingError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if request.name.chars().count() < MIN_NAME_LENGTH {
        return Err(BookingError::Validation(format!(
            "Name must be at least {} characters",
            MIN_NAME_LENGTH
        )));
    }
    if request.student_number.len() != STUDENT_NUMBER_LENGTH
        || !request.student_number.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(BookingError::Validation(format!(
            "Student number must be exactly {} digits",
            STUDENT_NUMBER_LENGTH
        )));
    }
    validate_notes(request.notes.as_deref())
}

fn validate_notes(notes: Option<&str>) -> Result<(), BookingError> {
    match notes {
        Some(notes) if notes.chars().count() > MAX_NOTES_LENGTH => Err(BookingError::Validation(
            format!("Notes must be at most {} characters", MAX_NOTES_LENGTH),
        )),
        _ => Ok(()),
    }
}

fn normalize_update(update: BookingUpdate) -> BookingUpdate {
    BookingUpdate {
        company: update.company.map(|c| c.trim().to_string()),
        notes: update.notes.map(|n| n.trim().to_string()),
    }
}

// --- Operations ---

/// Books a slot and returns the stored booking, including its freshly drawn code.
///
/// `now` is the calendar's local wall clock.
pub async fn create_booking(
    repository: &dyn BookingRepository,
    calendar: &SlotCalendar,
    request: CreateBookingRequest,
    now: NaiveDateTime,
) -> Result<Booking, BookingError> {
    let request = request.normalized();
    validate_booking_request(&request)?;

    let slot = resolve_slot(calendar, &request.slot)?;
    if is_slot_in_past(&slot, now) {
        return Err(BookingError::SlotInPast);
    }

    let existing = repository.list().await?;
    if !is_slot_available(&slot, &existing, now) {
        debug!("Slot {} is already booked", slot.key());
        return Err(BookingError::Conflict(
            "This slot has already been booked".to_string(),
        ));
    }

    let taken: HashSet<&str> = existing.iter().map(|b| b.code.as_str()).collect();
    let code = allocate_booking_code(&taken)?;

    let booking = Booking::new(
        code,
        request.name,
        request.student_number,
        request.company,
        request.notes,
        slot.key(),
    );
    let stored = repository.add(booking).await?;
    info!("Booked slot {}", stored.slot);
    Ok(stored)
}

pub async fn get_booking(
    repository: &dyn BookingRepository,
    code: &str,
) -> Result<Booking, BookingError> {
    ensure_valid_code(code)?;
    repository
        .get_by_code(code)
        .await?
        .ok_or(BookingError::NotFound)
}

/// Looks up a booking and checks it may still be changed on `today`.
async fn manageable_booking(
    repository: &dyn BookingRepository,
    code: &str,
    today: NaiveDate,
) -> Result<Booking, BookingError> {
    let booking = get_booking(repository, code).await?;
    let (slot_date, _) = parse_slot_key(&booking.slot)?;
    if !can_manage_booking(slot_date, today) {
        debug!("Booking for {} can no longer be managed on {}", booking.slot, today);
        return Err(BookingError::ManagementClosed);
    }
    Ok(booking)
}

/// Changes company and/or notes while the presentation day is still ahead.
pub async fn modify_booking(
    repository: &dyn BookingRepository,
    code: &str,
    update: BookingUpdate,
    today: NaiveDate,
) -> Result<Booking, BookingError> {
    let update = normalize_update(update);
    if update.is_empty() {
        return Err(BookingError::Validation(
            "Nothing to update: provide company or notes".to_string(),
        ));
    }
    validate_notes(update.notes.as_deref())?;

    manageable_booking(repository, code, today).await?;
    let updated = repository.update(code, update).await?;
    info!("Modified booking for slot {}", updated.slot);
    Ok(updated)
}

/// Cancels a booking while the presentation day is still ahead, freeing its slot.
pub async fn cancel_booking(
    repository: &dyn BookingRepository,
    code: &str,
    today: NaiveDate,
) -> Result<Booking, BookingError> {
    manageable_booking(repository, code, today).await?;
    let removed = repository.delete(code).await?;
    info!("Cancelled booking for slot {}", removed.slot);
    Ok(removed)
}

pub async fn list_bookings(
    repository: &dyn BookingRepository,
) -> Result<Vec<PublicBooking>, BookingError> {
    Ok(repository
        .list()
        .await?
        .into_iter()
        .map(PublicBooking::from)
        .collect())
}

/// Removes every booking when `supplied` matches the configured reset code.
pub async fn reset_all_bookings(
    repository: &dyn BookingRepository,
    admin: Option<&AdminConfig>,
    supplied: &str,
) -> Result<u64, BookingError> {
    let admin = admin.ok_or(BookingError::ResetNotConfigured)?;
    if supplied.is_empty() || supplied != admin.reset_code {
        warn!("Rejected booking reset with an invalid code");
        return Err(BookingError::InvalidResetCode);
    }
    let removed = repository.reset_all().await?;
    warn!("All bookings reset ({} removed)", removed);
    Ok(removed)
}
