use serde_json::Value;

use super::Raw;
use crate::error::Result;
use crate::models::KeepNote;

/// Identity is the resource name, "notes/..."
pub fn note(value: &Value) -> Result<KeepNote> {
    let raw = Raw::new("note", value);
    Ok(KeepNote {
        name: raw.id("name")?,
        title: raw.str("title"),
        text: raw.obj("body").obj("text").str("text"),
        create_time: raw.time("createTime"),
        update_time: raw.time("updateTime"),
        trashed: raw.bool("trashed"),
        pinned: raw.bool("pinned"),
        labels: raw
            .arr("labels")
            .iter()
            .map(|l| Raw::new("label", l).str("name"))
            .filter(|name| !name.is_empty())
            .collect(),
    })
}
