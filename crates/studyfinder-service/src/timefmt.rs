//! Session time normalization.

use chrono::NaiveTime;
use studyfinder_core::{FinderError, FinderResult};

/// Normalize a `HH:MM` (24-hour) session time into the canonical
/// 12-hour display form, e.g. `14:00` becomes `2:00 PM`.
pub fn normalize_session_time(raw: &str) -> FinderResult<String> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
        FinderError::validation("session time must be in HH:MM (24-hour) format")
    })?;
    Ok(time.format("%-I:%M %p").to_string())
}
