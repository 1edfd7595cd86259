//! Input validation helpers
//!
//! Validation runs before any network call; a failed check never produces a
//! request.

/// Phone: optional leading `+`, then at least 7 digits/spaces/dashes.
pub fn valid_phone(raw: &str) -> bool {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    rest.len() >= 7
        && !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
}

/// Email: single `@` with a dot somewhere after it.
pub fn valid_email(raw: &str) -> bool {
    let mut parts = raw.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !local.contains(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains(char::is_whitespace)
        }
        _ => false,
    }
}

/// Length of the human-facing order lookup code
pub const LOOKUP_CODE_LEN: usize = 5;

/// Normalize user input into a 5-digit lookup code: keep digits, left-pad
/// with zeros, keep the last five. Returns `None` when no digits remain.
pub fn normalize_lookup_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let padded = format!("{:0>width$}", digits, width = LOOKUP_CODE_LEN);
    Some(padded[padded.len() - LOOKUP_CODE_LEN..].to_string())
}

/// Whether an input already is a bare lookup code (exactly five digits)
pub fn is_lookup_code(raw: &str) -> bool {
    raw.len() == LOOKUP_CODE_LEN && raw.chars().all(|c| c.is_ascii_digit())
}

/// Clamp an operator-entered tray number to 1..=99, digits only.
pub fn clamp_tray_number(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).take(2).collect();
    if digits.is_empty() {
        return None;
    }
    let n: u32 = digits.parse().ok()?;
    Some(n.clamp(1, 99).to_string())
}

/// Catering form failures, surfaced inline before submission
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Ange kontaktpersonens namn.")]
    MissingContactName,

    #[error("Ange ett giltigt telefonnummer.")]
    InvalidPhone,

    #[error("Ange en giltig e-postadress.")]
    InvalidEmail,
}

/// Validate a catering submission; contact name, phone and email are the
/// required fields, everything else is optional.
pub fn validate_catering(
    submission: &shared::models::catering::CateringSubmission,
) -> Result<(), FormError> {
    if submission.contact_name.trim().is_empty() {
        return Err(FormError::MissingContactName);
    }
    if !valid_phone(&submission.phone) {
        return Err(FormError::InvalidPhone);
    }
    if !valid_email(&submission.email) {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_shapes() {
        assert!(valid_phone("070-123 45 67"));
        assert!(valid_phone("+46701234567"));
        assert!(!valid_phone("12345"));
        assert!(!valid_phone("snabbmat"));
        assert!(!valid_phone("070123456x"));
    }

    #[test]
    fn email_shapes() {
        assert!(valid_email("aram@example.com"));
        assert!(!valid_email("aram@example"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("a@b@c.se"));
        assert!(!valid_email("a b@c.se"));
    }

    #[test]
    fn lookup_code_normalization() {
        assert_eq!(normalize_lookup_code("123"), Some("00123".into()));
        assert_eq!(normalize_lookup_code("12-34-5"), Some("12345".into()));
        assert_eq!(normalize_lookup_code("9876543"), Some("76543".into()));
        assert_eq!(normalize_lookup_code("abc"), None);
    }

    #[test]
    fn lookup_code_detection() {
        assert!(is_lookup_code("12345"));
        assert!(!is_lookup_code("1234"));
        assert!(!is_lookup_code("123456"));
        assert!(!is_lookup_code("68af3c"));
    }

    #[test]
    fn tray_number_clamping() {
        assert_eq!(clamp_tray_number("7"), Some("7".into()));
        assert_eq!(clamp_tray_number("007"), Some("1".into()));
        assert_eq!(clamp_tray_number("0"), Some("1".into()));
        assert_eq!(clamp_tray_number("123"), Some("12".into()));
        assert_eq!(clamp_tray_number("bord"), None);
    }

    #[test]
    fn catering_form_checks_run_in_order() {
        use shared::models::catering::{CateringLayout, CateringSubmission, YesNo};

        let base = CateringSubmission {
            contact_name: "Zara".into(),
            phone: "08-123 45 67".into(),
            email: "zara@example.com".into(),
            company: None,
            event_date: None,
            event_time: None,
            guests: Some(40),
            budget_per_person_kr: None,
            street: None,
            postal_code: None,
            city: None,
            layout: CateringLayout::Buffet,
            requires_serving_staff: YesNo::Yes,
            needs_equipment: YesNo::No,
            allergies: None,
            notes: None,
        };
        assert!(validate_catering(&base).is_ok());

        let missing = CateringSubmission {
            contact_name: "  ".into(),
            ..base.clone()
        };
        assert_eq!(
            validate_catering(&missing),
            Err(FormError::MissingContactName)
        );

        let bad_phone = CateringSubmission {
            phone: "123".into(),
            ..base.clone()
        };
        assert_eq!(validate_catering(&bad_phone), Err(FormError::InvalidPhone));

        let bad_email = CateringSubmission {
            email: "zara@example".into(),
            ..base
        };
        assert_eq!(validate_catering(&bad_email), Err(FormError::InvalidEmail));
    }
}
