//! Typed clients, one per API, over a shared [`ServiceCache`](crate::ServiceCache)
//!
//! Each client holds the cached handle for its API. Construct as many as
//! needed from one cache; they share the credential and the handles.

mod calendar;
mod contacts;
mod docs;
mod drive;
mod drive_labels;
mod gmail;
mod keep;
mod meet;
mod sheets;
mod slides;
mod tasks;

pub use calendar::{CalendarClient, NewEvent};
pub use contacts::ContactsClient;
pub use docs::DocsClient;
pub use drive::{DriveClient, ShareRole};
pub use drive_labels::DriveLabelsClient;
pub use gmail::GmailClient;
pub use keep::KeepClient;
pub use meet::MeetClient;
pub use sheets::{Rgb, SheetsClient, ValueInputOption};
pub use slides::SlidesClient;
pub use tasks::{DEFAULT_TASKLIST, NewTask, TaskUpdate, TasksClient};

use std::borrow::Cow;

/// Percent-encode one path segment (ids, ranges)
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
