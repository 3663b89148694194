use crate::error::SyncResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod google_calendar;
pub mod reconciler;

pub use google_calendar::{CalendarEvent, GoogleCalendarClient};
pub use reconciler::{LocationTable, Reconciler, RunReport};

/// Remote calendar the reconciler reads from and writes to
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Events starting at or after `time_min`, recurring events expanded,
    /// ordered by start time
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
    ) -> SyncResult<Vec<CalendarEvent>>;

    /// Delete one event
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()>;

    /// Replace an event with `event` and return the stored version
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> SyncResult<CalendarEvent>;
}
