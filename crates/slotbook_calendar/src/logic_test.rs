#[cfg(test)]
mod tests {
    use crate::logic::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use chrono_tz::Tz;
    use slotbook_common::Booking;
    use slotbook_config::{CalendarConfig, SlotTemplateConfig};
    use std::collections::HashSet;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    fn at(d: &str, t: &str) -> NaiveDateTime {
        date(d).and_time(time(t))
    }

    fn template(start: &str, end: &str) -> TimeSlotTemplate {
        TimeSlotTemplate::parse(start, end).unwrap()
    }

    fn booking_for(slot: &str) -> Booking {
        Booking::new("1234", "Ada Lovelace", "20251234", None, None, slot)
    }

    // Calendar with one date, one morning and one afternoon template
    fn small_calendar() -> SlotCalendar {
        SlotCalendar::new(
            vec![date("2025-02-02")],
            vec![template("10:10", "10:30")],
            vec![template("14:10", "14:30")],
            Tz::Europe__Zurich,
        )
        .unwrap()
    }

    #[test]
    fn test_default_calendar_generates_full_cross_product() {
        let calendar = SlotCalendar::default();
        let slots = generate_time_slots(&calendar);

        assert_eq!(calendar.dates().len(), 6);
        assert_eq!(calendar.morning().len(), 7);
        assert_eq!(calendar.afternoon().len(), 7);
        assert_eq!(slots.len(), 6 * (7 + 7), "dates x (morning + afternoon)");

        let keys: HashSet<String> = slots.iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), slots.len(), "every slot key must be unique");
        assert!(slots.iter().all(|s| s.is_available));
    }

    #[test]
    fn test_generation_order_is_date_then_morning_then_afternoon() {
        let slots = generate_time_slots(&SlotCalendar::default());

        assert_eq!(slots[0].key(), "2025-01-25 - 10:10");
        assert_eq!(slots[6].key(), "2025-01-25 - 12:40");
        assert_eq!(slots[7].key(), "2025-01-25 - 14:10");
        assert_eq!(slots[13].key(), "2025-01-25 - 16:40");
        assert_eq!(slots[14].key(), "2025-01-26 - 10:10");
        assert_eq!(slots.last().unwrap().key(), "2025-02-09 - 16:40");
        assert_eq!(slots[0].end_time, time("10:30"));
    }

    #[test]
    fn test_generation_is_repeatable() {
        let calendar = SlotCalendar::default();
        assert_eq!(generate_time_slots(&calendar), generate_time_slots(&calendar));
    }

    #[test]
    fn test_small_calendar_both_slots_available_before_start() {
        // Test case: two slots, nothing booked, "now" before the first start
        let calendar = small_calendar();
        let slots = generate_time_slots(&calendar);
        let now = at("2025-02-02", "10:09");

        assert_eq!(slots.len(), 2);
        for slot in &slots {
            assert!(is_slot_available(slot, &[], now), "{} should be bookable", slot.key());
        }
    }

    #[test]
    fn test_slot_unavailable_once_started() {
        let slots = generate_time_slots(&small_calendar());
        let morning = &slots[0];

        assert!(!is_slot_available(morning, &[], at("2025-02-02", "10:10")), "start == now");
        assert!(!is_slot_available(morning, &[], at("2025-02-02", "10:11")));
        assert!(is_slot_available(&slots[1], &[], at("2025-02-02", "10:11")));
        assert!(is_slot_in_past(morning, at("2025-02-03", "00:00")));
    }

    #[test]
    fn test_slot_unavailable_when_key_is_booked() {
        let slots = generate_time_slots(&small_calendar());
        let now = at("2025-01-01", "00:00");
        let bookings = vec![booking_for("2025-02-02 - 10:10")];

        assert!(!is_slot_available(&slots[0], &bookings, now));
        assert!(is_slot_available(&slots[1], &bookings, now));

        // A key that differs only in format does not match
        let sloppy = vec![booking_for("2025-02-02 - 14:10 ")];
        assert!(is_slot_available(&slots[1], &sloppy, now));
    }

    #[test]
    fn test_annotate_availability_matches_predicate() {
        let calendar = SlotCalendar::default();
        let bookings = vec![
            booking_for("2025-02-08 - 10:35"),
            booking_for("2025-02-09 - 16:40"),
        ];
        let now = at("2025-02-01", "13:00");

        let annotated = annotate_availability(generate_time_slots(&calendar), &bookings, now);

        for slot in &annotated {
            assert_eq!(
                slot.is_available,
                is_slot_available(slot, &bookings, now),
                "mismatch for {}",
                slot.key()
            );
        }
        // 2025-02-01 afternoon (7) + 2025-02-02 (14) + 2025-02-08/09 (28) minus 2 booked
        assert_eq!(available_slots_count(&annotated, now), 7 + 14 + 28 - 2);
        assert_eq!(
            next_available_slot(&annotated, now).map(|s| s.key()),
            Some("2025-02-01 - 14:10".to_string())
        );
    }

    #[test]
    fn test_next_available_slot_none_when_everything_passed() {
        let calendar = SlotCalendar::default();
        let now = at("2025-03-01", "00:00");
        let annotated = annotate_availability(generate_time_slots(&calendar), &[], now);

        assert_eq!(available_slots_count(&annotated, now), 0);
        assert!(next_available_slot(&annotated, now).is_none());
    }

    #[test]
    fn test_validate_slot_timing_requires_start_and_end() {
        let calendar = SlotCalendar::default();

        assert!(validate_slot_timing(&calendar, time("10:10"), time("10:30")));
        assert!(validate_slot_timing(&calendar, time("16:40"), time("17:00")));
        assert!(!validate_slot_timing(&calendar, time("10:10"), time("10:35")), "end must match too");
        assert!(!validate_slot_timing(&calendar, time("10:15"), time("10:35")));
        assert!(!validate_slot_timing(&calendar, time("13:10"), time("13:30")));
    }

    #[test]
    fn test_slot_key_round_trip() {
        for slot in generate_time_slots(&SlotCalendar::default()) {
            let key = format_slot_key(&slot);
            assert_eq!(parse_slot_key(&key).unwrap(), (slot.date, slot.start_time));
            assert_eq!(resolve_slot(&SlotCalendar::default(), &key).unwrap(), slot);
        }
    }

    #[test]
    fn test_parse_slot_key_is_strict() {
        for bad in [
            "",
            "2025-02-02",
            "2025-02-02 10:10",
            "2025-02-02 -10:10",
            "2025-2-2 - 10:10",
            "2025-02-02 - 9:05",
            "2025-02-02 - 10:10:00",
            "2025-02-30 - 10:10",
            " 2025-02-02 - 10:10",
        ] {
            assert!(
                matches!(parse_slot_key(bad), Err(CalendarError::InvalidSlotKey(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_resolve_slot_rejects_out_of_calendar_slots() {
        let calendar = SlotCalendar::default();

        assert_eq!(
            resolve_slot(&calendar, "2025-02-03 - 10:10"),
            Err(CalendarError::NotPresentationDate(date("2025-02-03")))
        );
        assert!(matches!(
            resolve_slot(&calendar, "2025-02-02 - 10:15"),
            Err(CalendarError::UnknownSlot(_))
        ));
        assert!(matches!(
            resolve_slot(&calendar, "tomorrow at ten"),
            Err(CalendarError::InvalidSlotKey(_))
        ));

        let slot = resolve_slot(&calendar, "2025-02-02 - 15:25").unwrap();
        assert_eq!(slot.end_time, time("15:45"));
    }

    #[test]
    fn test_can_manage_booking_only_before_presentation_day() {
        let (slot_date, _) = parse_slot_key("2025-02-08 - 10:10").unwrap();

        assert!(!can_manage_booking(slot_date, date("2025-02-08")), "same day is too late");
        assert!(!can_manage_booking(slot_date, date("2025-02-09")));
        assert!(can_manage_booking(slot_date, date("2025-02-07")));
    }

    #[test]
    fn test_format_time_range() {
        assert_eq!(format_time_range(time("10:10"), time("10:30")), "10.10 am - 10.30 am");
        assert_eq!(format_time_range(time("11:50"), time("12:10")), "11.50 am - 12.10 pm");
        assert_eq!(format_time_range(time("14:10"), time("14:30")), "2.10 pm - 2.30 pm");
        assert_eq!(format_time_range(time("16:40"), time("17:00")), "4.40 pm - 5.00 pm");
    }

    #[test]
    fn test_display_formats() {
        let slot = resolve_slot(&SlotCalendar::default(), "2025-02-02 - 10:10").unwrap();

        assert_eq!(format_slot_display(&slot), "Sunday, February 2, 2025 - 10:10");
        assert_eq!(format_short_date(slot.date), "Sun, Feb 2");
    }

    #[test]
    fn test_group_slots_by_date_keeps_order() {
        let slots = generate_time_slots(&SlotCalendar::default());
        let groups = group_slots_by_date(&slots);

        assert_eq!(groups.len(), 6);
        let first_day = groups.get(&date("2025-01-25")).unwrap();
        assert_eq!(first_day.len(), 14);
        assert_eq!(first_day[0].start_time, time("10:10"));
        assert_eq!(first_day[13].start_time, time("16:40"));
        assert!(is_presentation_date(&SlotCalendar::default(), date("2025-02-09")));
        assert!(!is_presentation_date(&SlotCalendar::default(), date("2025-02-10")));
    }

    #[test]
    fn test_time_slot_serializes_like_the_wire_format() {
        let slot = resolve_slot(&SlotCalendar::default(), "2025-02-02 - 10:10").unwrap();
        let json = serde_json::to_value(&slot).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "date": "2025-02-02",
                "startTime": "10:10",
                "endTime": "10:30",
                "isAvailable": true
            })
        );
        let back: TimeSlot = serde_json::from_value(json).unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn test_from_config_overrides() {
        let config = CalendarConfig {
            time_zone: "America/New_York".to_string(),
            presentation_dates: Some(vec!["2099-03-01".to_string(), "2099-03-02".to_string()]),
            morning_slots: Some(vec![SlotTemplateConfig {
                start: "09:00".to_string(),
                end: "09:20".to_string(),
            }]),
            afternoon_slots: None,
        };

        let calendar = SlotCalendar::from_config(&config).unwrap();

        assert_eq!(calendar.time_zone(), Tz::America__New_York);
        assert_eq!(calendar.dates(), &[date("2099-03-01"), date("2099-03-02")]);
        assert_eq!(calendar.morning(), &[template("09:00", "09:20")]);
        assert_eq!(calendar.afternoon().len(), 7, "afternoon keeps the built-in templates");
        assert_eq!(generate_time_slots(&calendar).len(), 2 * 8);
    }

    #[test]
    fn test_from_config_rejects_bad_input() {
        let base = CalendarConfig::default();

        let bad_zone = CalendarConfig {
            time_zone: "Mars/Olympus".to_string(),
            ..base.clone()
        };
        assert_eq!(
            SlotCalendar::from_config(&bad_zone).unwrap_err(),
            CalendarError::InvalidTimeZone("Mars/Olympus".to_string())
        );

        let bad_date = CalendarConfig {
            presentation_dates: Some(vec!["01/02/2099".to_string()]),
            ..base.clone()
        };
        assert!(matches!(
            SlotCalendar::from_config(&bad_date),
            Err(CalendarError::InvalidDate(_))
        ));

        let duplicate_date = CalendarConfig {
            presentation_dates: Some(vec!["2099-03-01".to_string(), "2099-03-01".to_string()]),
            ..base.clone()
        };
        assert!(matches!(
            SlotCalendar::from_config(&duplicate_date),
            Err(CalendarError::DuplicateEntry(_))
        ));

        let backwards = CalendarConfig {
            morning_slots: Some(vec![SlotTemplateConfig {
                start: "10:30".to_string(),
                end: "10:10".to_string(),
            }]),
            ..base.clone()
        };
        assert!(matches!(
            SlotCalendar::from_config(&backwards),
            Err(CalendarError::InvalidTemplate { .. })
        ));

        let clashing = CalendarConfig {
            afternoon_slots: Some(vec![SlotTemplateConfig {
                start: "10:10".to_string(),
                end: "10:30".to_string(),
            }]),
            ..base
        };
        assert!(matches!(
            SlotCalendar::from_config(&clashing),
            Err(CalendarError::DuplicateEntry(_))
        ));
    }
}
