//! Google Calendar events

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, SecondsFormat, Utc};
use log::info;
use serde_json::{Value, json};
use std::sync::Arc;

use super::segment;
use crate::error::{Error, Result};
use crate::models::CalendarEvent;
use crate::parse::{self, Batch, Raw};
use crate::service::{ServiceCache, ServiceHandle};

const PRIMARY: &str = "primary";

/// A timed event to create
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
    pub location: String,
    pub attendees: Vec<String>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            description: String::new(),
            location: String::new(),
            attendees: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn inviting<I, S>(mut self, attendees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = attendees.into_iter().map(Into::into).collect();
        self
    }

    fn to_body(&self) -> Result<Value> {
        if self.end < self.start {
            return Err(Error::invalid_argument("event ends before it starts"));
        }
        let mut body = json!({
            "summary": self.title,
            "description": self.description,
            "location": self.location,
            "start": { "dateTime": rfc3339(self.start) },
            "end": { "dateTime": rfc3339(self.end) },
        });
        if !self.attendees.is_empty() {
            body["attendees"] = self
                .attendees
                .iter()
                .map(|email| json!({ "email": email }))
                .collect();
        }
        Ok(body)
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Midnight-to-midnight in the local timezone, as UTC instants.
/// Daylight-saving days come out 23 or 25 hours long.
fn local_day(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.succ_opt().unwrap_or(date);
    (local_midnight(date), local_midnight(next))
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

pub struct CalendarClient {
    service: Arc<ServiceHandle>,
    calendar_id: String,
}

impl CalendarClient {
    /// Client for the account's primary calendar
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.calendar()?,
            calendar_id: PRIMARY.to_string(),
        })
    }

    pub fn with_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Events in `[start, end)` ordered by start time, recurring events expanded
    pub fn get_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_results: u32,
        query: Option<&str>,
    ) -> Result<Batch<CalendarEvent>> {
        let time_min = rfc3339(start);
        let time_max = rfc3339(end);
        let max_results = max_results.to_string();
        let mut params = vec![
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
            ("maxResults", max_results.as_str()),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
        ];
        if let Some(q) = query {
            params.push(("q", q));
        }
        let response = self.service.get(&self.events_path(), &params)?;
        Ok(Batch::parse(
            Raw::new("events", &response).arr("items"),
            parse::event,
        ))
    }

    pub fn get_today_events(&self) -> Result<Batch<CalendarEvent>> {
        self.get_events_on_date(Local::now().date_naive())
    }

    /// From now through the next `days` days
    pub fn get_upcoming_events(&self, days: i64) -> Result<Batch<CalendarEvent>> {
        let now = Utc::now();
        let end = Duration::try_days(days)
            .and_then(|span| now.checked_add_signed(span))
            .ok_or_else(|| Error::invalid_argument(format!("{} days is out of range", days)))?;
        self.get_events(now, end, 100, None)
    }

    pub fn get_events_on_date(&self, date: NaiveDate) -> Result<Batch<CalendarEvent>> {
        let (start, end) = local_day(date);
        self.get_events(start, end, 100, None)
    }

    /// Create the event and return its id; `send_updates` emails the attendees
    pub fn create_event(&self, event: &NewEvent, send_updates: bool) -> Result<String> {
        let send_updates = if send_updates { "all" } else { "none" };
        let response = self.service.post(
            &self.events_path(),
            &[("sendUpdates", send_updates)],
            &event.to_body()?,
        )?;
        let id = Raw::new("event", &response).id("id")?;
        info!("Created event {}: {}", id, event.title);
        Ok(id)
    }

    pub fn update_event_description(&self, event_id: &str, description: &str) -> Result<()> {
        self.service.patch(
            &self.event_path(event_id),
            &[],
            &json!({ "description": description }),
        )?;
        info!("Updated description for event {}", event_id);
        Ok(())
    }

    pub fn delete_event(&self, event_id: &str) -> Result<()> {
        self.service.delete(&self.event_path(event_id))?;
        info!("Deleted event {}", event_id);
        Ok(())
    }

    fn events_path(&self) -> String {
        format!("calendars/{}/events", segment(&self.calendar_id))
    }

    fn event_path(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_path(), segment(event_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_new_event_body() {
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap();
        let event = NewEvent::new("1:1", start, start + Duration::minutes(30))
            .at("Room 4")
            .inviting(["bob@x.com"]);
        let body = event.to_body().unwrap();

        assert_eq!(body["summary"], "1:1");
        assert_eq!(body["start"]["dateTime"], "2025-03-04T15:00:00Z");
        assert_eq!(body["end"]["dateTime"], "2025-03-04T15:30:00Z");
        assert_eq!(body["location"], "Room 4");
        assert_eq!(body["attendees"], json!([{"email": "bob@x.com"}]));
    }

    #[test]
    fn test_new_event_without_attendees_omits_field() {
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap();
        let body = NewEvent::new("Focus", start, start).to_body().unwrap();
        assert!(body.get("attendees").is_none());
    }

    #[test]
    fn test_new_event_rejects_inverted_window() {
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap();
        let event = NewEvent::new("Backwards", start, start - Duration::hours(1));
        assert!(matches!(event.to_body(), Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_local_day_starts_on_that_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let (start, end) = local_day(date);
        assert_eq!(start.with_timezone(&Local).date_naive(), date);
        assert!(end - start >= Duration::hours(23) && end - start <= Duration::hours(25));
    }

    #[test]
    fn test_local_days_are_contiguous_all_year() {
        let mut date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        while date.year() == 2025 {
            let next = date.succ_opt().unwrap();
            assert_eq!(local_day(date).1, local_day(next).0, "gap after {}", date);
            date = next;
        }
    }
}
