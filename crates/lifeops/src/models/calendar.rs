//! Calendar events

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    At(DateTime<Utc>),
    /// All-day events carry a date with no zone
    AllDay(NaiveDate),
}

impl EventTime {
    /// Instant used for ordering and durations; all-day dates start at UTC midnight
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            EventTime::At(dt) => *dt,
            EventTime::AllDay(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub description: String,
    pub location: String,
    /// Attendee emails, excluding the calendar owner
    pub attendees: Vec<String>,
    pub organizer: String,
    pub html_link: String,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventTime::AllDay(_))
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end.instant() - self.start.instant())
            .num_minutes()
            .max(0)
    }

    /// "HH:MM" in UTC, or "all-day"
    pub fn start_label(&self) -> String {
        match self.start {
            EventTime::At(dt) => dt.format("%H:%M").to_string(),
            EventTime::AllDay(_) => "all-day".to_string(),
        }
    }

    pub fn end_label(&self) -> String {
        match self.end {
            EventTime::At(dt) => dt.format("%H:%M").to_string(),
            EventTime::AllDay(_) => String::new(),
        }
    }
}
