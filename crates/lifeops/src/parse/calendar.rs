use chrono::{NaiveDate, Utc};
use serde_json::Value;

use super::Raw;
use crate::error::Result;
use crate::models::{CalendarEvent, EventTime};

/// `events.list` item or `events.get`
pub fn event(value: &Value) -> Result<CalendarEvent> {
    let raw = Raw::new("event", value);
    let id = raw.id("id")?;

    let start = raw.obj("start");
    let all_day = start.opt_str("date").is_some() && start.opt_str("dateTime").is_none();
    let start_time = event_time(start, all_day, None);
    let end_time = event_time(raw.obj("end"), all_day, Some(start_time));

    // The calendar owner shows up as an attendee with "self": true
    let attendees = raw
        .arr("attendees")
        .iter()
        .map(|a| Raw::new("attendee", a))
        .filter(|a| !a.bool("self"))
        .map(|a| a.str("email"))
        .filter(|email| !email.is_empty())
        .collect();

    Ok(CalendarEvent {
        id,
        title: raw.str_or("summary", "(no title)"),
        start: start_time,
        end: end_time,
        description: raw.str("description"),
        location: raw.str("location"),
        attendees,
        organizer: raw.obj("organizer").str("email"),
        html_link: raw.str("htmlLink"),
    })
}

/// Missing or unparseable times fall back to `fallback`, then to now
fn event_time(raw: Raw<'_>, all_day: bool, fallback: Option<EventTime>) -> EventTime {
    let parsed = if all_day {
        raw.opt_str("date")
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
            .map(EventTime::AllDay)
    } else {
        raw.time("dateTime").map(EventTime::At)
    };
    parsed
        .or(fallback)
        .unwrap_or_else(|| EventTime::At(Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timed_event() {
        let e = event(&json!({
            "id": "e1",
            "summary": "Standup",
            "start": {"dateTime": "2025-03-01T09:00:00-05:00", "timeZone": "America/New_York"},
            "end": {"dateTime": "2025-03-01T09:15:00-05:00"},
            "attendees": [
                {"email": "me@x.com", "self": true},
                {"email": "ann@x.com", "responseStatus": "accepted"}
            ],
            "organizer": {"email": "ann@x.com"}
        }))
        .unwrap();
        assert!(!e.is_all_day());
        assert_eq!(e.start_label(), "14:00");
        assert_eq!(e.duration_minutes(), 15);
        assert_eq!(e.attendees, vec!["ann@x.com"]);
        assert_eq!(e.organizer, "ann@x.com");
    }

    #[test]
    fn test_all_day_event() {
        let e = event(&json!({
            "id": "e2",
            "start": {"date": "2025-03-01"},
            "end": {"date": "2025-03-02"}
        }))
        .unwrap();
        assert!(e.is_all_day());
        assert_eq!(e.title, "(no title)");
        assert_eq!(e.duration_minutes(), 1440);
    }

    #[test]
    fn test_missing_end_uses_start() {
        let e = event(&json!({"id": "e3", "start": {"dateTime": "2025-03-01T09:00:00Z"}})).unwrap();
        assert_eq!(e.start, e.end);
    }
}
