use serde_json::Value;

use super::Raw;
use crate::error::Result;
use crate::models::MeetingSpace;

pub fn space(value: &Value) -> Result<MeetingSpace> {
    let raw = Raw::new("space", value);
    Ok(MeetingSpace {
        name: raw.id("name")?,
        meeting_uri: raw.str("meetingUri"),
        meeting_code: raw.str("meetingCode"),
    })
}
