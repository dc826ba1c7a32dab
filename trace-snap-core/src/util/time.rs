use chrono::{DateTime, NaiveDateTime};

/// real seconds elapsed between two ISO 8601 timestamps. accepts RFC 3339
/// stamps with an offset, falling back to naive local stamps without one.
/// None when either side fails to parse.
pub fn seconds_elapsed(t1: &str, t2: &str) -> Option<f64> {
    match (parse_timestamp(t1), parse_timestamp(t2)) {
        (Some(start), Some(end)) => Some((end - start) / 1000.0),
        _ => None,
    }
}

/// milliseconds since the epoch, or None when the stamp is unparseable.
fn parse_timestamp(raw: &str) -> Option<f64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis() as f64);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
}
