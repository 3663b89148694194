//! Google Calendar access: REST client, event model and OAuth credentials.

mod client;
pub mod models;
pub mod oauth;
pub mod time;
pub mod token;

pub use client::GoogleCalendarClient;
pub use models::CalendarEvent;
pub use token::{Credential, TokenManager};
