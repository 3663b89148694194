use super::models::{CalendarEvent, EventList};
use super::token::Credential;
use crate::components::CalendarStore;
use crate::error::{google_calendar_error, SyncResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar REST client
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(credential: &Credential) -> Self {
        Self {
            client: Client::new(),
            access_token: credential.access_token.clone(),
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// `<base>/calendars/<calendar_id>/events[/<event_id>]`, ids percent-encoded
    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| google_calendar_error("Calendar API URL cannot take a path"))?;
            segments
                .pop_if_empty()
                .push("calendars")
                .push(calendar_id)
                .push("events");
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }

        Ok(url)
    }
}

/// Turn a non-success response into an error carrying status and body
async fn check_status(response: Response, action: &str) -> SyncResult<Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(google_calendar_error(&format!(
            "Failed to {}: HTTP {} - {}",
            action, status, error_body
        )));
    }
    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: Response, action: &str) -> SyncResult<T> {
    check_status(response, action)
        .await?
        .json::<T>()
        .await
        .map_err(|e| google_calendar_error(&format!("Failed to parse {} response: {}", action, e)))
}

#[async_trait]
impl CalendarStore for GoogleCalendarClient {
    #[instrument(skip(self), level = "debug")]
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
    ) -> SyncResult<Vec<CalendarEvent>> {
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url(calendar_id, None)?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &time_min)
                    .append_pair("singleEvents", "true")
                    .append_pair("orderBy", "startTime");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self
                .client
                .get(url)
                .bearer_auth(&self.access_token)
                .send()
                .await?;
            let page: EventList = parse_json(response, "fetch events").await?;
            debug!(count = page.items.len(), "Fetched page of events");

            events.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        check_status(response, "delete event").await?;
        Ok(())
    }

    #[instrument(skip(self, event), level = "debug")]
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> SyncResult<CalendarEvent> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        // PUT replaces the whole resource
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await?;

        parse_json(response, "update event").await
    }
}
