//! Format validation of recognized field texts.
//!
//! Decoded text is only surfaced when it both clears the model's
//! confidence threshold and matches the field's expected format. Date
//! fields must be real `DD.MM.YYYY` calendar dates, the front serial
//! must match the `NN NN NNNNNN` block layout, names are free-form.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::classes::FieldKind;

static SERIAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}\s[0-9]{2}\s[0-9]{6}$").expect("serial pattern compiles"));

/// Whether `text` is structurally valid for a field of the given kind.
pub fn is_valid_text(kind: FieldKind, text: &str) -> bool {
    match kind {
        FieldKind::Date => NaiveDate::parse_from_str(text, "%d.%m.%Y").is_ok(),
        FieldKind::Serial => SERIAL_PATTERN.is_match(text),
        FieldKind::Name | FieldKind::Free => true,
    }
}

/// Acceptance gate: confident enough and structurally valid.
///
/// The threshold comparison is strict, so an empty decode (word score
/// 0) can never be accepted.
pub fn is_accepted(kind: FieldKind, text: &str, word_score: f32, threshold: f32) -> bool {
    word_score > threshold && is_valid_text(kind, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_validation() {
        assert!(is_valid_text(FieldKind::Date, "01.01.2000"));
        assert!(is_valid_text(FieldKind::Date, "21.03.1987"));
        assert!(is_valid_text(FieldKind::Date, "29.02.2020"));
        // Not a real calendar date.
        assert!(!is_valid_text(FieldKind::Date, "31.02.2020"));
        assert!(!is_valid_text(FieldKind::Date, "2020-03-21"));
        assert!(!is_valid_text(FieldKind::Date, "21.03.1987x"));
        assert!(!is_valid_text(FieldKind::Date, ""));
    }

    #[test]
    fn test_serial_validation() {
        assert!(is_valid_text(FieldKind::Serial, "12 34 567890"));
        assert!(!is_valid_text(FieldKind::Serial, "1234567890"));
        assert!(!is_valid_text(FieldKind::Serial, "12 34 56789"));
        assert!(!is_valid_text(FieldKind::Serial, "AB 34 567890"));
        assert!(!is_valid_text(FieldKind::Serial, " 12 34 567890"));
    }

    #[test]
    fn test_names_are_free_form() {
        assert!(is_valid_text(FieldKind::Name, "ПЕТРОВ"));
        assert!(is_valid_text(FieldKind::Name, ""));
    }

    #[test]
    fn test_acceptance_gate() {
        assert!(is_accepted(FieldKind::Name, "ПЕТРОВ", 0.9, 0.5));
        // Threshold is strict.
        assert!(!is_accepted(FieldKind::Name, "ПЕТРОВ", 0.5, 0.5));
        // Confident but malformed.
        assert!(!is_accepted(FieldKind::Date, "31.02.2020", 0.99, 0.5));
        // Empty decode carries score 0 and a zero threshold still rejects it.
        assert!(!is_accepted(FieldKind::Name, "", 0.0, 0.0));
    }
}
