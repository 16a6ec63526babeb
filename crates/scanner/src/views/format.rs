use chrono::{DateTime, NaiveDateTime, Utc};

/// Truncate an identifier for display: anything longer than 12 characters
/// shows the first 6 and last 6 joined by an ellipsis marker.
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 12 {
        address.to_string()
    } else {
        format!("{}...{}", &address[..6], &address[address.len() - 6..])
    }
}

/// Relative time from a Unix-seconds timestamp. Absent yields "Unknown".
pub fn format_time_ago(timestamp: Option<i64>, now: DateTime<Utc>) -> String {
    let Some(ts) = timestamp else {
        return "Unknown".to_string();
    };
    let seconds_ago = (now.timestamp() - ts).max(0);

    if seconds_ago < 60 {
        format!("{seconds_ago}s ago")
    } else if seconds_ago < 3600 {
        format!("{}m ago", seconds_ago / 60)
    } else if seconds_ago < 86400 {
        format!("{}h ago", seconds_ago / 3600)
    } else {
        format!("{}d ago", seconds_ago / 86400)
    }
}

/// Lenient ISO-8601 parse. The server emits naive `isoformat()` strings;
/// other producers may send RFC 3339 with an offset. Naive times are
/// assumed UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Relative time from an ISO-8601 string, "Unknown" when absent or
/// unparsable.
pub fn format_time_ago_iso(timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    format_time_ago(
        timestamp.and_then(parse_timestamp).map(|dt| dt.timestamp()),
        now,
    )
}
