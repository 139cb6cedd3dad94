// --- File: crates/slotbook_common/src/models.rs ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reservation of one presentation slot.
///
/// `slot` holds the composite key `"YYYY-MM-DD - HH:mm"` of the booked slot and
/// `code` the 4-digit credential used to look it up, modify or cancel it.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[cfg_attr(feature = "openapi", schema(example = "4821"))]
    pub code: String,
    #[cfg_attr(feature = "openapi", schema(example = "Ada Lovelace"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "20251234"))]
    pub student_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "2025-02-02 - 10:10"))]
    pub slot: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a booking with both timestamps set to now.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        student_number: impl Into<String>,
        company: Option<String>,
        notes: Option<String>,
        slot: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            name: name.into(),
            student_number: student_number.into(),
            company,
            notes,
            slot: slot.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. Only fields present in `update` change, an empty
    /// string clears the field, and `updated_at` is bumped.
    pub fn apply(&mut self, update: &BookingUpdate, now: DateTime<Utc>) {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }
        if let Some(company) = &update.company {
            self.company = non_empty(company);
        }
        if let Some(notes) = &update.notes {
            self.notes = non_empty(notes);
        }
        self.updated_at = now;
    }
}

/// The fields a booking holder may change after creation.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BookingUpdate {
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.notes.is_none()
    }
}
