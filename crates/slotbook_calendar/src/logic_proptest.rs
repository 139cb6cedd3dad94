#[cfg(test)]
mod tests {
    use crate::logic::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use chrono_tz::Tz;
    use proptest::prelude::*;
    use slotbook_common::Booking;
    use std::collections::HashSet;

    // Build `count` consecutive dates starting at day `offset` of 2099
    fn dates(offset: i64, count: usize) -> Vec<NaiveDate> {
        let base = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap() + Duration::days(offset);
        (0..count as i64).map(|i| base + Duration::days(i)).collect()
    }

    // 20 minute templates with 5 minute gaps, starting at the given minute of the day
    fn templates(first_minute: u32, count: usize) -> Vec<TimeSlotTemplate> {
        (0..count as u32)
            .map(|i| {
                let start = first_minute + i * 25;
                TimeSlotTemplate {
                    start: NaiveTime::from_hms_opt(start / 60, start % 60, 0).unwrap(),
                    end: NaiveTime::from_hms_opt((start + 20) / 60, (start + 20) % 60, 0).unwrap(),
                }
            })
            .collect()
    }

    fn calendar(day_offset: i64, days: usize, morning: usize, afternoon: usize) -> SlotCalendar {
        SlotCalendar::new(
            dates(day_offset, days),
            templates(8 * 60, morning),
            templates(13 * 60, afternoon),
            Tz::Europe__Zurich,
        )
        .unwrap()
    }

    proptest! {
        // |D| x (|morning| + |afternoon|) slots, all keys unique
        #[test]
        fn test_generator_cardinality_and_unique_keys(
            day_offset in 0..300i64,
            days in 0..10usize,
            morning in 0..8usize,
            afternoon in 0..8usize,
        ) {
            let cal = calendar(day_offset, days, morning, afternoon);
            let slots = generate_time_slots(&cal);

            prop_assert_eq!(slots.len(), days * (morning + afternoon));
            let keys: HashSet<String> = slots.iter().map(|s| s.key()).collect();
            prop_assert_eq!(keys.len(), slots.len());
        }

        // A slot is never available once its start is at or before now
        #[test]
        fn test_started_slots_are_unavailable(
            days in 1..5usize,
            minutes_after_first_start in 0..(5 * 24 * 60i64),
        ) {
            let cal = calendar(0, days, 5, 5);
            let slots = generate_time_slots(&cal);
            let now = slots[0].starts_at() + Duration::minutes(minutes_after_first_start);

            for slot in &slots {
                if slot.starts_at() <= now {
                    prop_assert!(!is_slot_available(slot, &[], now));
                } else {
                    prop_assert!(is_slot_available(slot, &[], now));
                }
            }
        }

        // Booked keys are exactly the unavailable future slots
        #[test]
        fn test_booked_keys_block_only_their_slot(
            picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let cal = SlotCalendar::default();
            let slots = generate_time_slots(&cal);
            let booked: HashSet<String> = picks.iter().map(|i| slots[i.index(slots.len())].key()).collect();
            let bookings: Vec<Booking> = booked
                .iter()
                .map(|key| Booking::new("1234", "Ada", "20251234", None, None, key.clone()))
                .collect();
            let now = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();

            for slot in &slots {
                prop_assert_eq!(is_slot_available(slot, &bookings, now), !booked.contains(&slot.key()));
            }
        }

        // Every generated key resolves back to its slot and passes timing validation
        #[test]
        fn test_generated_slots_resolve_and_validate(index in any::<prop::sample::Index>()) {
            let cal = SlotCalendar::default();
            let slots = generate_time_slots(&cal);
            let slot = &slots[index.index(slots.len())];

            prop_assert!(validate_slot_timing(&cal, slot.start_time, slot.end_time));
            prop_assert_eq!(&resolve_slot(&cal, &slot.key()).unwrap(), slot);
        }

        // Arbitrary start/end pairs validate only when they are one of the compiled-in pairs
        #[test]
        fn test_timing_validator_matches_templates(start in 0..(24 * 60u32), len in 1..60u32) {
            let cal = SlotCalendar::default();
            let end_minute = (start + len).min(24 * 60 - 1);
            let start_text = format!("{:02}:{:02}", start / 60, start % 60);
            let end_text = format!("{:02}:{:02}", end_minute / 60, end_minute % 60);
            let start_time = NaiveTime::from_hms_opt(start / 60, start % 60, 0).unwrap();
            let end_time = NaiveTime::from_hms_opt(end_minute / 60, end_minute % 60, 0).unwrap();

            let is_template = MORNING_SLOTS
                .iter()
                .chain(AFTERNOON_SLOTS.iter())
                .any(|&(s, e)| s == start_text && e == end_text);
            prop_assert_eq!(validate_slot_timing(&cal, start_time, end_time), is_template);
        }

        // Shifting either end of a template pair by any amount never validates
        #[test]
        fn test_timing_validator_rejects_shifted_pairs(
            index in 0..14usize,
            shift in 1..30i64,
            move_end in any::<bool>(),
        ) {
            let cal = SlotCalendar::default();
            let (start, end) = MORNING_SLOTS.iter().chain(AFTERNOON_SLOTS.iter()).nth(index).copied().unwrap();
            let start = NaiveTime::parse_from_str(start, "%H:%M").unwrap();
            let end = NaiveTime::parse_from_str(end, "%H:%M").unwrap();

            prop_assert!(validate_slot_timing(&cal, start, end));
            let (start, end) = if move_end {
                (start, end + Duration::minutes(shift))
            } else {
                (start + Duration::minutes(shift), end)
            };
            prop_assert!(!validate_slot_timing(&cal, start, end));
        }

        // Management is allowed exactly while the slot date lies after today
        #[test]
        fn test_can_manage_booking_is_strict(slot_day in 0..400i64, today_day in 0..400i64) {
            let base = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
            let slot_date = base + Duration::days(slot_day);
            let today = base + Duration::days(today_day);
            prop_assert_eq!(can_manage_booking(slot_date, today), slot_day > today_day);
        }
    }
}
