#[cfg(test)]
mod tests {
    use crate::logic::*;
    use proptest::prelude::*;

    fn request(name: &str, student_number: &str, notes: Option<String>) -> CreateBookingRequest {
        CreateBookingRequest {
            name: name.to_string(),
            student_number: student_number.to_string(),
            company: None,
            notes,
            slot: "2099-03-01 - 10:10".to_string(),
        }
    }

    proptest! {
        // Any eight ASCII digits are a valid student number
        #[test]
        fn test_eight_digit_student_numbers_pass(number in "[0-9]{8}") {
            prop_assert!(validate_booking_request(&request("Ada", &number, None)).is_ok());
        }

        // Other lengths never pass
        #[test]
        fn test_other_lengths_fail(number in "[0-9]{0,7}|[0-9]{9,12}") {
            let req = request("Ada", &number, None).normalized();
            prop_assert!(validate_booking_request(&req).is_err());
        }

        // Notes are limited by characters, not bytes
        #[test]
        fn test_notes_limit_counts_characters(notes in "\\PC{0,30}") {
            let req = request("Ada", "20251234", Some(notes.clone()));
            let ok = validate_booking_request(&req).is_ok();
            prop_assert_eq!(ok, notes.chars().count() <= MAX_NOTES_LENGTH);
        }

        // The code check accepts exactly four ASCII digits
        #[test]
        fn test_code_check_matches_pattern(code in "\\PC{0,6}") {
            let expected = code.len() == 4 && code.chars().all(|c| c.is_ascii_digit());
            prop_assert_eq!(is_valid_booking_code(&code), expected);
        }
    }
}
