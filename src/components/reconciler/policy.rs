use chrono::{NaiveTime, Timelike};
use std::ops::Range;

/// Title marker of practice sessions
pub const PRACTICE_MARKER: &str = "- Practice";

const VENDOR_PREFIX: &str = "FORMULA 1 ";

/// Reminders are dropped for events starting from 23:00:00 ...
const QUIET_FROM_SECS: u32 = 23 * 3600;
/// ... through 06:00:00 inclusive
const QUIET_UNTIL_SECS: u32 = 6 * 3600;

pub fn is_practice_session(summary: &str) -> bool {
    summary.contains(PRACTICE_MARKER)
}

/// Replace the vendor title `FORMULA 1 <anything> <year>` with `F1 <location>`.
///
/// Summaries without a vendor title for `year` are returned unchanged.
pub fn rewrite_title(summary: &str, year: i32, location: &str) -> String {
    match find_vendor_title(summary, year) {
        Some(range) => format!(
            "{}F1 {}{}",
            &summary[..range.start],
            location,
            &summary[range.end..]
        ),
        None => summary.to_string(),
    }
}

/// Leftmost vendor title, extended to the last ` <year>` on the same line
fn find_vendor_title(summary: &str, year: i32) -> Option<Range<usize>> {
    let year_suffix = format!(" {}", year);
    let mut search_from = 0;

    while let Some(offset) = summary[search_from..].find(VENDOR_PREFIX) {
        let start = search_from + offset;
        let body_start = start + VENDOR_PREFIX.len();
        let line_end = summary[body_start..]
            .find('\n')
            .map_or(summary.len(), |i| body_start + i);

        if let Some(pos) = summary[body_start..line_end].rfind(&year_suffix) {
            return Some(start..body_start + pos + year_suffix.len());
        }
        search_from = start + 1;
    }

    None
}

/// Whether an event starting at `time` falls in the 23:00 to 06:00 quiet window
pub fn is_overnight(time: NaiveTime) -> bool {
    let secs = time.num_seconds_from_midnight();
    secs >= QUIET_FROM_SECS
        || secs < QUIET_UNTIL_SECS
        || (secs == QUIET_UNTIL_SECS && time.nanosecond() == 0)
}
