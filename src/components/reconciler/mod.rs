//! Reconciliation of a fetched calendar against the naming and reminder policy.
//!
//! A run is a fixed pipeline: fetch, delete practice sessions, rewrite the
//! remaining events, and optionally list them. Every store call is awaited
//! before the next one is issued and the first fault aborts the run; events
//! already changed stay changed.

mod locations;
pub mod policy;

pub use locations::{LocationTable, UNKNOWN_LOCATION};

use super::google_calendar::models::{CalendarEvent, Reminders};
use super::google_calendar::time::{effective_start, start_of_year, start_time_of_day};
use super::CalendarStore;
use crate::config::Passes;
use crate::error::{other_error, SyncResult};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::{debug, info};

/// Counts of what a run did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub deleted: usize,
    pub updated: usize,
}

/// Applies the policy to one calendar through a [`CalendarStore`]
pub struct Reconciler<S> {
    store: S,
    calendar_id: String,
    locations: LocationTable,
    passes: Passes,
    output: Mutex<Box<dyn Write + Send>>,
}

impl<S: CalendarStore> Reconciler<S> {
    pub fn new(store: S, calendar_id: impl Into<String>, locations: LocationTable) -> Self {
        Self {
            store,
            calendar_id: calendar_id.into(),
            locations,
            passes: Passes::default(),
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    pub fn with_passes(mut self, passes: Passes) -> Self {
        self.passes = passes;
        self
    }

    /// Send progress notices somewhere other than stdout
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Mutex::new(Box::new(output));
        self
    }

    fn notice(&self, line: &str) -> SyncResult<()> {
        let mut output = self
            .output
            .lock()
            .map_err(|_| other_error("Notice output lock poisoned"))?;
        writeln!(output, "{}", line)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the whole pipeline for events since January 1 of `year`.
    ///
    /// `year` is also the year matched in vendor titles, so a run uses one
    /// year throughout.
    pub async fn run(&self, year: i32) -> SyncResult<RunReport> {
        let mut report = RunReport::default();

        self.notice("Getting the events since the start of the year...")?;
        let time_min = start_of_year(year)?;
        let events = self.store.list_events(&self.calendar_id, time_min).await?;
        report.fetched = events.len();
        info!(count = events.len(), calendar = %self.calendar_id, "Fetched events");

        if events.is_empty() {
            self.notice("No upcoming events found.")?;
            return Ok(report);
        }

        self.notice("- Checking events to remove...")?;
        let events = if self.passes.delete_practice {
            let remaining = self.delete_practice_events(events).await?;
            report.deleted = report.fetched - remaining.len();
            remaining
        } else {
            debug!("Practice deletion disabled");
            events
        };

        self.notice("- Checking events to update...")?;
        let events = if self.passes.update_events {
            let updated = self.update_events(events, year).await?;
            report.updated = updated.len();
            updated
        } else {
            debug!("Event updates disabled");
            events
        };

        if self.passes.list_events {
            self.notice("- Checking events to print...")?;
            for (start, summary) in list_events(&events) {
                self.notice(&format!("{} {}", start, summary))?;
            }
        }

        Ok(report)
    }

    /// Delete every practice session and return the other events in order
    pub async fn delete_practice_events(
        &self,
        events: Vec<CalendarEvent>,
    ) -> SyncResult<Vec<CalendarEvent>> {
        let mut remaining = Vec::with_capacity(events.len());
        let mut deleted = 0;

        for event in events {
            if policy::is_practice_session(event.summary()?) {
                debug!(id = %event.id, summary = ?event.summary, "Deleting practice event");
                self.store.delete_event(&self.calendar_id, &event.id).await?;
                deleted += 1;
            } else {
                remaining.push(event);
            }
        }

        if deleted > 0 {
            info!(deleted, "Deleted practice events");
            self.notice("- \"Practice\" events have been deleted")?;
        }

        Ok(remaining)
    }

    /// Rewrite and resubmit each event; returns the events as the store now holds them
    pub async fn update_events(
        &self,
        events: Vec<CalendarEvent>,
        year: i32,
    ) -> SyncResult<Vec<CalendarEvent>> {
        let mut updated = Vec::with_capacity(events.len());

        for event in events {
            let rewritten = self.rewrite_event(event, year)?;
            debug!(id = %rewritten.id, summary = ?rewritten.summary, "Updating event");
            let stored = self
                .store
                .update_event(&self.calendar_id, &rewritten.id, &rewritten)
                .await?;
            updated.push(stored);
        }

        info!(updated = updated.len(), "Updated events");
        self.notice("- Updated event summary, description and notifications")?;
        Ok(updated)
    }

    /// Apply the title, description and reminder rules to one event
    pub fn rewrite_event(&self, mut event: CalendarEvent, year: i32) -> SyncResult<CalendarEvent> {
        let summary = event.summary()?;
        let location = self.locations.resolve(summary);
        let new_summary = policy::rewrite_title(summary, year, location);

        event.summary = Some(new_summary);
        event.description = Some(String::new());

        if policy::is_overnight(start_time_of_day(&event)?) {
            event.reminders = Some(Reminders::suppressed());
        }

        Ok(event)
    }
}

/// `(start, summary)` for each event; all-day events report their date
pub fn list_events(events: &[CalendarEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .map(|event| {
            (
                effective_start(event).unwrap_or("(no start)").to_string(),
                event.summary.clone().unwrap_or_default(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::{EventDateTime, ReminderOverride};
    use crate::error::Error;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    /// Store that refuses every call; the rewrite logic never touches it
    struct OfflineStore;

    #[async_trait]
    impl CalendarStore for OfflineStore {
        async fn list_events(&self, _: &str, _: DateTime<Utc>) -> SyncResult<Vec<CalendarEvent>> {
            Err(crate::error::google_calendar_error("offline"))
        }

        async fn delete_event(&self, _: &str, _: &str) -> SyncResult<()> {
            Err(crate::error::google_calendar_error("offline"))
        }

        async fn update_event(
            &self,
            _: &str,
            _: &str,
            _: &CalendarEvent,
        ) -> SyncResult<CalendarEvent> {
            Err(crate::error::google_calendar_error("offline"))
        }
    }

    fn reconciler() -> Reconciler<OfflineStore> {
        Reconciler::new(OfflineStore, "cal", LocationTable::formula1())
    }

    fn custom_reminders() -> Reminders {
        Reminders {
            use_default: false,
            overrides: Some(vec![ReminderOverride {
                method: "popup".to_string(),
                minutes: 30,
            }]),
        }
    }

    fn event(summary: &str, start: &str) -> CalendarEvent {
        CalendarEvent {
            id: "race".to_string(),
            summary: Some(summary.to_string()),
            description: Some("Watch live on F1 TV".to_string()),
            start: Some(EventDateTime {
                date_time: Some(start.to_string()),
                date: None,
                time_zone: None,
            }),
            reminders: Some(custom_reminders()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rewrite_event() {
        let rewritten = reconciler()
            .rewrite_event(
                event("FORMULA 1 AUSTRALIAN GRAND PRIX 2024", "2024-03-24T15:00:00+11:00"),
                2024,
            )
            .unwrap();

        assert_eq!(rewritten.summary.as_deref(), Some("F1 Austrália"));
        assert_eq!(rewritten.description.as_deref(), Some(""));
        assert_eq!(rewritten.reminders, Some(custom_reminders()));
    }

    #[test]
    fn test_reminder_suppression_boundaries() {
        let cases = [
            ("2024-12-08T23:30:00+04:00", true),
            ("2024-12-08T05:59:59+04:00", true),
            ("2024-12-08T06:00:00+04:00", true),
            ("2024-12-08T23:00:00+04:00", true),
            ("2024-12-08T06:00:01+04:00", false),
            ("2024-12-08T22:59:59+04:00", false),
        ];

        for (start, suppressed) in cases {
            let rewritten = reconciler()
                .rewrite_event(event("FORMULA 1 ABU DHABI GRAND PRIX 2024", start), 2024)
                .unwrap();
            assert_eq!(
                rewritten.summary.as_deref(),
                Some("F1 Abu Dhabi, Emirados Árabes Unidos")
            );
            let expected = if suppressed {
                Reminders::suppressed()
            } else {
                custom_reminders()
            };
            assert_eq!(rewritten.reminders, Some(expected), "start {}", start);
        }
    }

    #[test]
    fn test_rewrite_is_idempotent_on_canonical_titles() {
        let once = reconciler()
            .rewrite_event(event("F1 Austrália", "2024-03-24T02:00:00Z"), 2024)
            .unwrap();
        let twice = reconciler().rewrite_event(once.clone(), 2024).unwrap();

        assert_eq!(once.summary.as_deref(), Some("F1 Austrália"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_description_cleared_even_without_title_match() {
        let rewritten = reconciler()
            .rewrite_event(event("Team launch", "2024-02-13T12:00:00Z"), 2024)
            .unwrap();
        assert_eq!(rewritten.summary.as_deref(), Some("Team launch"));
        assert_eq!(rewritten.description.as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_events_are_rejected() {
        let mut no_summary = event("x", "2024-02-13T12:00:00Z");
        no_summary.summary = None;
        assert!(matches!(
            reconciler().rewrite_event(no_summary, 2024),
            Err(Error::InvalidEvent(_))
        ));

        let mut all_day = event("FORMULA 1 BRITISH GRAND PRIX 2024", "");
        all_day.start = Some(EventDateTime {
            date_time: None,
            date: Some("2024-07-07".to_string()),
            time_zone: None,
        });
        assert!(matches!(
            reconciler().rewrite_event(all_day, 2024),
            Err(Error::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_list_events_falls_back_to_date() {
        let mut all_day = event("Season launch", "");
        all_day.start = Some(EventDateTime {
            date_time: None,
            date: Some("2024-02-15".to_string()),
            time_zone: None,
        });
        let timed = event("F1 Bahrain", "2024-03-02T15:00:00Z");

        assert_eq!(
            list_events(&[all_day, timed]),
            vec![
                ("2024-02-15".to_string(), "Season launch".to_string()),
                ("2024-03-02T15:00:00Z".to_string(), "F1 Bahrain".to_string()),
            ]
        );
    }
}
