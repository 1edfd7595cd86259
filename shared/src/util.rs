/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse an RFC 3339 timestamp into Unix milliseconds.
///
/// Returns `None` for missing or malformed input; callers fall back to their
/// own defaults rather than failing the surrounding entity.
pub fn parse_millis(raw: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Current UTC time as an RFC 3339 string (fallback for missing `createdAt`).
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_millis_roundtrip() {
        assert_eq!(
            parse_millis("2025-01-01T12:00:00.000Z"),
            Some(1_735_732_800_000)
        );
        assert_eq!(parse_millis("not a timestamp"), None);
        assert_eq!(parse_millis(""), None);
    }

    #[test]
    fn parse_millis_accepts_offsets() {
        // +02:00 is two hours behind the equivalent UTC instant
        let utc = parse_millis("2025-06-01T12:00:00Z").unwrap();
        let offset = parse_millis("2025-06-01T14:00:00+02:00").unwrap();
        assert_eq!(utc, offset);
    }
}
