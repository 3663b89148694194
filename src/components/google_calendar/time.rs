use super::models::CalendarEvent;
use crate::error::{invalid_event_error, other_error, SyncResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Time of day at which a timed event starts, in the offset the store returned
pub fn start_time_of_day(event: &CalendarEvent) -> SyncResult<NaiveTime> {
    let start_time = event
        .start
        .as_ref()
        .and_then(|start| start.date_time.as_deref())
        .ok_or_else(|| invalid_event_error(&format!("event {} has no start time", event.id)))?;

    let dt = DateTime::parse_from_rfc3339(start_time).map_err(|e| {
        invalid_event_error(&format!(
            "event {} has an unparseable start time '{}': {}",
            event.id, start_time, e
        ))
    })?;

    Ok(dt.time())
}

/// Start as sent by the store: the timestamp when present, else the all-day date
pub fn effective_start(event: &CalendarEvent) -> Option<&str> {
    let start = event.start.as_ref()?;
    start.date_time.as_deref().or(start.date.as_deref())
}

/// Midnight UTC on January 1 of `year`
pub fn start_of_year(year: i32) -> SyncResult<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| other_error(&format!("Invalid year: {}", year)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::EventDateTime;

    fn event_starting(date_time: Option<&str>, date: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            id: "e1".to_string(),
            start: Some(EventDateTime {
                date_time: date_time.map(str::to_string),
                date: date.map(str::to_string),
                time_zone: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_time_of_day_keeps_store_offset() {
        let event = event_starting(Some("2024-03-02T23:30:00+03:00"), None);
        assert_eq!(
            start_time_of_day(&event).unwrap(),
            NaiveTime::from_hms_opt(23, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_all_day_event_has_no_time_of_day() {
        let event = event_starting(None, Some("2024-03-02"));
        assert!(start_time_of_day(&event).is_err());
        assert_eq!(effective_start(&event), Some("2024-03-02"));
    }

    #[test]
    fn test_garbage_start_is_rejected() {
        let event = event_starting(Some("tomorrow-ish"), None);
        assert!(start_time_of_day(&event).is_err());
    }

    #[test]
    fn test_effective_start_prefers_timestamp() {
        let event = event_starting(Some("2024-03-02T15:00:00Z"), Some("2024-03-02"));
        assert_eq!(effective_start(&event), Some("2024-03-02T15:00:00Z"));
        assert_eq!(effective_start(&CalendarEvent::default()), None);
    }

    #[test]
    fn test_start_of_year() {
        let start = start_of_year(2024).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
