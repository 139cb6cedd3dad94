// --- File: crates/slotbook_calendar/src/logic.rs ---
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use slotbook_common::{Booking, SlotbookError};
use slotbook_config::{CalendarConfig, SlotTemplateConfig};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Days on which presentations take place.
pub const PRESENTATION_DATES: [&str; 6] = [
    "2025-01-25",
    "2025-01-26", // First weekend
    "2025-02-01",
    "2025-02-02", // Second weekend
    "2025-02-08",
    "2025-02-09", // Third weekend
];

/// Morning templates: 20 minutes each, 5 minute gaps.
pub const MORNING_SLOTS: [(&str, &str); 7] = [
    ("10:10", "10:30"),
    ("10:35", "10:55"),
    ("11:00", "11:20"),
    ("11:25", "11:45"),
    ("11:50", "12:10"),
    ("12:15", "12:35"),
    ("12:40", "13:00"),
];

/// Afternoon templates: 20 minutes each, 5 minute gaps.
pub const AFTERNOON_SLOTS: [(&str, &str); 7] = [
    ("14:10", "14:30"),
    ("14:35", "14:55"),
    ("15:00", "15:20"),
    ("15:25", "15:45"),
    ("15:50", "16:10"),
    ("16:15", "16:35"),
    ("16:40", "17:00"),
];

pub const DEFAULT_TIME_ZONE: Tz = Tz::Europe__Zurich;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const SLOT_KEY_SEPARATOR: &str = " - ";

// --- Error Type ---
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid time '{0}', expected HH:mm")]
    InvalidTime(String),
    #[error("Slot template {start}-{end} must end after it starts")]
    InvalidTemplate { start: String, end: String },
    #[error("Duplicate calendar entry: {0}")]
    DuplicateEntry(String),
    #[error("Unknown time zone '{0}'")]
    InvalidTimeZone(String),
    #[error("Invalid slot '{0}', expected 'YYYY-MM-DD - HH:mm'")]
    InvalidSlotKey(String),
    #[error("{0} is not a presentation date")]
    NotPresentationDate(NaiveDate),
    #[error("No presentation slot starts at {0}")]
    UnknownSlot(String),
}

impl From<CalendarError> for SlotbookError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::InvalidTemplate { .. }
            | CalendarError::DuplicateEntry(_)
            | CalendarError::InvalidTimeZone(_) => SlotbookError::ConfigError(err.to_string()),
            _ => SlotbookError::ValidationError(err.to_string()),
        }
    }
}

/// Serde helpers for `HH:mm` times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

// --- Data Structures ---

/// One (start, end) pair of a daily session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlotTemplate {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlotTemplate {
    pub fn parse(start: &str, end: &str) -> Result<Self, CalendarError> {
        let template = Self {
            start: parse_time(start)?,
            end: parse_time(end)?,
        };
        if template.end <= template.start {
            return Err(CalendarError::InvalidTemplate {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(template)
    }
}

/// A bookable interval on a presentation date, identified by `(date, start_time)`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-02-02"))]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:10"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:30"))]
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl TimeSlot {
    fn from_template(date: NaiveDate, template: &TimeSlotTemplate) -> Self {
        Self {
            date,
            start_time: template.start,
            end_time: template.end,
            is_available: true,
        }
    }

    /// The composite key stored in `Booking::slot`.
    pub fn key(&self) -> String {
        format_slot_key(self)
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}

/// The set of presentation dates and daily templates slots are generated from,
/// plus the time zone whose wall clock decides what "now" is.
#[derive(Debug, Clone)]
pub struct SlotCalendar {
    dates: Vec<NaiveDate>,
    morning: Vec<TimeSlotTemplate>,
    afternoon: Vec<TimeSlotTemplate>,
    time_zone: Tz,
}

impl Default for SlotCalendar {
    /// The compiled-in dates and templates in Europe/Zurich.
    fn default() -> Self {
        let templates = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .filter_map(|(start, end)| TimeSlotTemplate::parse(start, end).ok())
                .collect::<Vec<_>>()
        };
        Self {
            dates: PRESENTATION_DATES
                .iter()
                .filter_map(|d| parse_date(d).ok())
                .collect(),
            morning: templates(&MORNING_SLOTS),
            afternoon: templates(&AFTERNOON_SLOTS),
            time_zone: DEFAULT_TIME_ZONE,
        }
    }
}

impl SlotCalendar {
    /// Builds a calendar, refusing duplicate dates and templates sharing a start time.
    pub fn new(
        dates: Vec<NaiveDate>,
        morning: Vec<TimeSlotTemplate>,
        afternoon: Vec<TimeSlotTemplate>,
        time_zone: Tz,
    ) -> Result<Self, CalendarError> {
        let mut seen_dates = HashSet::new();
        if let Some(dup) = dates.iter().find(|d| !seen_dates.insert(**d)) {
            return Err(CalendarError::DuplicateEntry(dup.format(DATE_FORMAT).to_string()));
        }
        let mut seen_starts = HashSet::new();
        if let Some(dup) = morning
            .iter()
            .chain(afternoon.iter())
            .find(|t| !seen_starts.insert(t.start))
        {
            return Err(CalendarError::DuplicateEntry(
                dup.start.format(TIME_FORMAT).to_string(),
            ));
        }
        Ok(Self {
            dates,
            morning,
            afternoon,
            time_zone,
        })
    }

    /// Applies the `[calendar]` overrides on top of the compiled-in constants.
    pub fn from_config(config: &CalendarConfig) -> Result<Self, CalendarError> {
        let defaults = Self::default();

        let time_zone = Tz::from_str(&config.time_zone)
            .map_err(|_| CalendarError::InvalidTimeZone(config.time_zone.clone()))?;

        let dates = match &config.presentation_dates {
            Some(dates) => dates
                .iter()
                .map(|d| parse_date(d))
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.dates,
        };
        let parse_templates = |templates: &Option<Vec<SlotTemplateConfig>>,
                               fallback: Vec<TimeSlotTemplate>| {
            match templates {
                Some(list) => list
                    .iter()
                    .map(|t| TimeSlotTemplate::parse(&t.start, &t.end))
                    .collect::<Result<Vec<_>, _>>(),
                None => Ok(fallback),
            }
        };
        let morning = parse_templates(&config.morning_slots, defaults.morning)?;
        let afternoon = parse_templates(&config.afternoon_slots, defaults.afternoon)?;

        debug!(
            "Slot calendar: {} dates, {} morning and {} afternoon templates in {}",
            dates.len(),
            morning.len(),
            afternoon.len(),
            time_zone.name()
        );
        Self::new(dates, morning, afternoon, time_zone)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn morning(&self) -> &[TimeSlotTemplate] {
        &self.morning
    }

    pub fn afternoon(&self) -> &[TimeSlotTemplate] {
        &self.afternoon
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    fn templates(&self) -> impl Iterator<Item = &TimeSlotTemplate> {
        self.morning.iter().chain(self.afternoon.iter())
    }

    /// Current wall-clock time in the calendar's time zone.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.time_zone).naive_local()
    }

    /// Current date in the calendar's time zone.
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

// --- Parsing & Formatting ---

pub fn parse_date(value: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|d| d.format(DATE_FORMAT).to_string() == value)
        .ok_or_else(|| CalendarError::InvalidDate(value.to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, CalendarError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .ok()
        .filter(|t| t.format(TIME_FORMAT).to_string() == value)
        .ok_or_else(|| CalendarError::InvalidTime(value.to_string()))
}

/// `"YYYY-MM-DD - HH:mm"`
pub fn format_slot_key(slot: &TimeSlot) -> String {
    format!(
        "{}{}{}",
        slot.date.format(DATE_FORMAT),
        SLOT_KEY_SEPARATOR,
        slot.start_time.format(TIME_FORMAT)
    )
}

/// Splits a slot key into its date and start time. Only the exact zero-padded
/// format produced by [`format_slot_key`] is accepted.
pub fn parse_slot_key(key: &str) -> Result<(NaiveDate, NaiveTime), CalendarError> {
    let invalid = || CalendarError::InvalidSlotKey(key.to_string());
    let (date, time) = key.split_once(SLOT_KEY_SEPARATOR).ok_or_else(invalid)?;
    let date = parse_date(date).map_err(|_| invalid())?;
    let time = parse_time(time).map_err(|_| invalid())?;
    Ok((date, time))
}

/// `"10.10 am - 10.30 am"`. Hours after noon drop by twelve, 12 itself reads pm.
pub fn format_time_range(start: NaiveTime, end: NaiveTime) -> String {
    fn format_time(time: NaiveTime) -> String {
        let hour = time.hour();
        let period = if hour >= 12 { "pm" } else { "am" };
        let display_hour = if hour > 12 { hour - 12 } else { hour };
        format!("{}.{:02} {}", display_hour, time.minute(), period)
    }
    format!("{} - {}", format_time(start), format_time(end))
}

/// `"Sunday, February 2, 2025 - 10:10"`
pub fn format_slot_display(slot: &TimeSlot) -> String {
    format!(
        "{} - {}",
        slot.date.format("%A, %B %-d, %Y"),
        slot.start_time.format(TIME_FORMAT)
    )
}

/// `"Sun, Feb 2"`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

// --- Generation ---

/// Every slot of the calendar: dates in order, each with its morning then afternoon
/// templates, all marked available.
pub fn generate_time_slots(calendar: &SlotCalendar) -> Vec<TimeSlot> {
    calendar
        .dates
        .iter()
        .flat_map(|date| {
            calendar
                .templates()
                .map(move |template| TimeSlot::from_template(*date, template))
        })
        .collect()
}

pub fn is_presentation_date(calendar: &SlotCalendar, date: NaiveDate) -> bool {
    calendar.dates.contains(&date)
}

// --- Availability ---

/// True once the slot's start is no longer strictly after `now`.
pub fn is_slot_in_past(slot: &TimeSlot, now: NaiveDateTime) -> bool {
    slot.starts_at() <= now
}

/// A slot can be booked while it starts strictly after `now` and no booking holds its key.
pub fn is_slot_available(slot: &TimeSlot, bookings: &[Booking], now: NaiveDateTime) -> bool {
    if is_slot_in_past(slot, now) {
        return false;
    }
    let key = slot.key();
    !bookings.iter().any(|booking| booking.slot == key)
}

/// Sets `is_available` on each slot.
pub fn annotate_availability(
    slots: Vec<TimeSlot>,
    bookings: &[Booking],
    now: NaiveDateTime,
) -> Vec<TimeSlot> {
    let booked: HashSet<&str> = bookings.iter().map(|b| b.slot.as_str()).collect();
    slots
        .into_iter()
        .map(|mut slot| {
            slot.is_available =
                !is_slot_in_past(&slot, now) && !booked.contains(slot.key().as_str());
            slot
        })
        .collect()
}

pub fn available_slots_count(slots: &[TimeSlot], now: NaiveDateTime) -> usize {
    slots
        .iter()
        .filter(|slot| slot.is_available && !is_slot_in_past(slot, now))
        .count()
}

/// The earliest available slot that has not started yet.
pub fn next_available_slot(slots: &[TimeSlot], now: NaiveDateTime) -> Option<&TimeSlot> {
    slots
        .iter()
        .filter(|slot| slot.is_available && !is_slot_in_past(slot, now))
        .min_by_key(|slot| slot.starts_at())
}

pub fn group_slots_by_date(slots: &[TimeSlot]) -> BTreeMap<NaiveDate, Vec<TimeSlot>> {
    let mut groups: BTreeMap<NaiveDate, Vec<TimeSlot>> = BTreeMap::new();
    for slot in slots {
        groups.entry(slot.date).or_default().push(slot.clone());
    }
    groups
}

// --- Validation ---

/// True when `start` and `end` together equal one morning or afternoon template.
pub fn validate_slot_timing(calendar: &SlotCalendar, start: NaiveTime, end: NaiveTime) -> bool {
    calendar
        .templates()
        .any(|template| template.start == start && template.end == end)
}

/// Turns a client-supplied key into the calendar slot it names.
///
/// Fails when the key is malformed, the date is not a presentation date, or no template
/// starts at the given time.
pub fn resolve_slot(calendar: &SlotCalendar, key: &str) -> Result<TimeSlot, CalendarError> {
    let (date, start) = parse_slot_key(key)?;
    if !is_presentation_date(calendar, date) {
        return Err(CalendarError::NotPresentationDate(date));
    }
    let template = calendar
        .templates()
        .find(|template| template.start == start)
        .ok_or_else(|| CalendarError::UnknownSlot(key.to_string()))?;

    let slot = TimeSlot::from_template(date, template);
    if !validate_slot_timing(calendar, slot.start_time, slot.end_time) {
        return Err(CalendarError::UnknownSlot(key.to_string()));
    }
    Ok(slot)
}

/// Bookings may be modified or cancelled only before the presentation day.
pub fn can_manage_booking(slot_date: NaiveDate, today: NaiveDate) -> bool {
    slot_date > today
}
