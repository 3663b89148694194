use crate::error::{invalid_event_error, SyncResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Calendar event as returned by the Calendar API.
///
/// Updates replace the whole event, so every field the reconciler does not
/// model is kept in `extra` and written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarEvent {
    /// The event title, or an error if the store returned none
    pub fn summary(&self) -> SyncResult<&str> {
        self.summary
            .as_deref()
            .ok_or_else(|| invalid_event_error(&format!("event {} has no summary", self.id)))
    }
}

/// Start or end of an event: a timestamp for timed events, a date for all-day ones
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Per-event notification settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<ReminderOverride>>,
}

impl Reminders {
    /// Explicit empty override: no default and no custom reminders
    pub fn suppressed() -> Self {
        Self {
            use_default: false,
            overrides: Some(Vec::new()),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        !self.use_default && self.overrides.as_ref().is_some_and(|o| o.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

/// One page of an events listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unmodelled_fields_survive_a_round_trip() {
        let raw = json!({
            "id": "race1",
            "summary": "FORMULA 1 BRITISH GRAND PRIX 2024",
            "start": {"dateTime": "2024-07-07T15:00:00+01:00", "timeZone": "Europe/London"},
            "end": {"dateTime": "2024-07-07T17:00:00+01:00"},
            "etag": "\"3412\"",
            "attendees": [{"email": "fan@example.com"}],
            "reminders": {"useDefault": true}
        });

        let event: CalendarEvent = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(event.extra.len(), 3);
        assert!(event.extra.contains_key("attendees"));

        // Untouched events serialize back to exactly what the store sent
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }

    #[test]
    fn test_suppressed_reminders_serialize_empty_overrides() {
        let value = serde_json::to_value(Reminders::suppressed()).unwrap();
        assert_eq!(value, json!({"useDefault": false, "overrides": []}));
        assert!(Reminders::suppressed().is_suppressed());

        let default = Reminders {
            use_default: true,
            overrides: None,
        };
        assert!(!default.is_suppressed());
    }

    #[test]
    fn test_missing_summary_is_an_invalid_event() {
        let event = CalendarEvent {
            id: "busy".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            event.summary(),
            Err(crate::error::Error::InvalidEvent(_))
        ));
    }
}
