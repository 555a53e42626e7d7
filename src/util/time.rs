use chrono::{DateTime, Utc};

/// Get a timestamp in milliseconds since the UNIX epoch
pub fn timestamp_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Render a millisecond timestamp as `YYYY-MM-DD HH:MM` (UTC) for listings
pub fn format_millis(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
