//! Typed entities returned by the API clients

mod calendar;
mod contact;
mod document;
mod drive;
mod mail;
mod meet;
mod note;
mod task;

pub use calendar::{CalendarEvent, EventTime};
pub use contact::Contact;
pub use document::{GoogleDoc, Presentation, Slide};
pub use drive::{DriveFile, DriveLabel, FOLDER_MIME_TYPE, LabelField, LabelFieldType};
pub use mail::{EmailMessage, EmailThread};
pub use meet::MeetingSpace;
pub use note::KeepNote;
pub use task::{Task, TaskList, TaskStatus};
