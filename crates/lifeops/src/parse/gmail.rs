use serde_json::Value;
use std::collections::HashMap;

use super::{Batch, Raw};
use crate::error::Result;
use crate::mime::{HeaderMap, MessagePart, decode_plain_text, parse_date, split_addresses};
use crate::models::{EmailMessage, EmailThread};

/// `users.messages.get` with `format=full`
pub fn message(value: &Value) -> Result<EmailMessage> {
    let raw = Raw::new("message", value);
    let id = raw.id("id")?;

    // Odd fields inside the payload fall back per field; a non-object payload is empty
    let payload: MessagePart = value
        .get("payload")
        .and_then(|p| serde_json::from_value(p.clone()).ok())
        .unwrap_or_default();
    let headers = HeaderMap::from_headers(&payload.headers);

    Ok(EmailMessage {
        id,
        thread_id: raw.str("threadId"),
        subject: headers.get_or("subject", "(no subject)").to_string(),
        sender: headers.get_or("from", "").to_string(),
        recipients: split_addresses(headers.get_or("to", "")),
        date: parse_date(headers.get_or("date", "")),
        snippet: raw.str("snippet"),
        body_plain: decode_plain_text(&payload).trim().to_string(),
        label_ids: raw
            .arr("labelIds")
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    })
}

/// `users.threads.get`; malformed messages inside the thread are skipped
pub fn thread(value: &Value) -> Result<EmailThread> {
    let raw = Raw::new("thread", value);
    let id = raw.id("id")?;
    let messages = Batch::parse(raw.arr("messages"), message).into_items();
    let subject = messages
        .first()
        .map(|m| m.subject.clone())
        .unwrap_or_default();
    Ok(EmailThread {
        id,
        subject,
        messages,
    })
}

/// `users.labels.list` to label id → display name
pub fn label_map(value: &Value) -> HashMap<String, String> {
    Raw::new("labels", value)
        .arr("labels")
        .iter()
        .filter_map(|label| {
            let label = Raw::new("label", label);
            Some((label.id("id").ok()?, label.str("name")))
        })
        .collect()
}
