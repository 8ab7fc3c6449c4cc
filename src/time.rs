use chrono::prelude::{DateTime, Utc};
use std::time::{Duration, SystemTime};

pub fn iso8601(st: SystemTime) -> String {
    let dt: DateTime<Utc> = st.into();
    dt.format("%+").to_string()
}

/// Formats a countdown as `m:ss`.
pub fn countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
