//! Gmail: search, read, send, and label mutations

use log::info;
use rayon::prelude::*;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use super::segment;
use crate::error::{Error, Result};
use crate::mime::{
    MessagePart, OutboundMessage, build_outbound, decode_body_bytes, encode_raw, parse_rfc822,
};
use crate::models::{EmailMessage, EmailThread};
use crate::parse::{self, Batch, Raw};
use crate::service::{ServiceCache, ServiceHandle};

pub struct GmailClient {
    service: Arc<ServiceHandle>,
}

impl GmailClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.gmail()?,
        })
    }

    /// Label id to display name for every label in the mailbox
    pub fn label_map(&self) -> Result<HashMap<String, String>> {
        let response = self.service.get("users/me/labels", &[])?;
        Ok(parse::label_map(&response))
    }

    /// Run a Gmail query ("is:unread", "from:boss@x.com", ...) and fetch each hit.
    ///
    /// Messages are fetched in parallel; a message that fails to fetch or
    /// parse is skipped and reported in [`Batch::skipped`].
    pub fn search(&self, query: &str, max_results: u32) -> Result<Batch<EmailMessage>> {
        let max_results = max_results.to_string();
        let listing = self.service.get(
            "users/me/messages",
            &[("q", query), ("maxResults", &max_results)],
        )?;
        let ids: Vec<String> = Raw::new("messages", &listing)
            .arr("messages")
            .iter()
            .filter_map(|m| m.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let results: Vec<(Option<String>, Result<EmailMessage>)> = ids
            .into_par_iter()
            .map(|id| {
                let message = self.get_message(&id);
                (Some(id), message)
            })
            .collect();
        Ok(Batch::from_results(results))
    }

    pub fn unread(&self, max_results: u32) -> Result<Batch<EmailMessage>> {
        self.search("is:unread", max_results)
    }

    pub fn important_unread(&self, max_results: u32) -> Result<Batch<EmailMessage>> {
        self.search("is:unread is:important", max_results)
    }

    pub fn inbox(&self, max_results: u32) -> Result<Batch<EmailMessage>> {
        self.search("in:inbox", max_results)
    }

    pub fn get_message(&self, message_id: &str) -> Result<EmailMessage> {
        let response = self.service.get(
            &format!("users/me/messages/{}", segment(message_id)),
            &[("format", "full")],
        )?;
        parse::message(&response)
    }

    /// Fetch the message as sent (`format=raw`) and parse it locally
    pub fn get_raw_message(&self, message_id: &str) -> Result<MessagePart> {
        let response = self.service.get(
            &format!("users/me/messages/{}", segment(message_id)),
            &[("format", "raw")],
        )?;
        let raw = Raw::new("message", &response).id("raw")?;
        let bytes = decode_body_bytes(&raw).map_err(|_| Error::malformed("message", "raw"))?;
        Ok(parse_rfc822(&bytes))
    }

    pub fn get_thread(&self, thread_id: &str) -> Result<EmailThread> {
        let response = self.service.get(
            &format!("users/me/threads/{}", segment(thread_id)),
            &[("format", "full")],
        )?;
        parse::thread(&response)
    }

    /// Send and return the new message id
    pub fn send_message(&self, message: &OutboundMessage) -> Result<String> {
        let body = outbound_body(message)?;
        let response = self.service.post("users/me/messages/send", &[], &body)?;
        let id = Raw::new("message", &response).id("id")?;
        info!("Sent message {} to {}", id, message.to.join(", "));
        Ok(id)
    }

    /// Save as a draft and return the draft id
    pub fn create_draft(&self, message: &OutboundMessage) -> Result<String> {
        let body = json!({ "message": outbound_body(message)? });
        let response = self.service.post("users/me/drafts", &[], &body)?;
        let id = Raw::new("draft", &response).id("id")?;
        info!("Created draft {}", id);
        Ok(id)
    }

    pub fn mark_as_read(&self, message_id: &str) -> Result<()> {
        self.modify(message_id, &[], &["UNREAD"])
    }

    pub fn mark_as_unread(&self, message_id: &str) -> Result<()> {
        self.modify(message_id, &["UNREAD"], &[])
    }

    pub fn add_labels<S: AsRef<str>>(&self, message_id: &str, label_ids: &[S]) -> Result<()> {
        let labels: Vec<&str> = label_ids.iter().map(AsRef::as_ref).collect();
        self.modify(message_id, &labels, &[])
    }

    pub fn remove_labels<S: AsRef<str>>(&self, message_id: &str, label_ids: &[S]) -> Result<()> {
        let labels: Vec<&str> = label_ids.iter().map(AsRef::as_ref).collect();
        self.modify(message_id, &[], &labels)
    }

    /// Remove from the inbox; the message stays in All Mail
    pub fn archive(&self, message_id: &str) -> Result<()> {
        self.modify(message_id, &[], &["INBOX"])
    }

    pub fn trash_message(&self, message_id: &str) -> Result<()> {
        self.service.post(
            &format!("users/me/messages/{}/trash", segment(message_id)),
            &[],
            &json!({}),
        )?;
        info!("Trashed message {}", message_id);
        Ok(())
    }

    fn modify(&self, message_id: &str, add: &[&str], remove: &[&str]) -> Result<()> {
        self.service.post(
            &format!("users/me/messages/{}/modify", segment(message_id)),
            &[],
            &modify_body(add, remove),
        )?;
        info!("Modified labels on message {}: {}", message_id, label_change(add, remove));
        Ok(())
    }
}

fn outbound_body(message: &OutboundMessage) -> Result<Value> {
    if message.to.iter().all(|r| r.trim().is_empty()) {
        return Err(Error::invalid_argument("message has no recipients"));
    }
    let mut body = json!({ "raw": encode_raw(&build_outbound(message)) });
    if let Some(thread_id) = message.thread_id.as_deref() {
        body["threadId"] = json!(thread_id);
    }
    Ok(body)
}

/// `+STARRED -UNREAD` style summary for the log
fn label_change(add: &[&str], remove: &[&str]) -> String {
    add.iter()
        .map(|label| format!("+{}", label))
        .chain(remove.iter().map(|label| format!("-{}", label)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn modify_body(add: &[&str], remove: &[&str]) -> Value {
    let mut body = json!({});
    if !add.is_empty() {
        body["addLabelIds"] = json!(add);
    }
    if !remove.is_empty() {
        body["removeLabelIds"] = json!(remove);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::decode_plain_text;

    #[test]
    fn test_outbound_body_carries_thread_and_raw() {
        let message = OutboundMessage::new(["a@x.com"], "Re: plan", "sounds good")
            .in_thread("thread-1")
            .replying_to("<m1@mail.gmail.com>");
        let body = outbound_body(&message).unwrap();

        assert_eq!(body["threadId"], "thread-1");
        let raw = body["raw"].as_str().unwrap();
        assert!(!raw.contains('=') && !raw.contains('+') && !raw.contains('/'));

        let part = parse_rfc822(&decode_body_bytes(raw).unwrap());
        assert_eq!(decode_plain_text(&part), "sounds good");
    }

    #[test]
    fn test_outbound_body_requires_recipient() {
        let message = OutboundMessage::new(Vec::<String>::new(), "s", "b");
        assert!(matches!(
            outbound_body(&message),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_label_change_summary() {
        assert_eq!(label_change(&["STARRED"], &["UNREAD", "INBOX"]), "+STARRED -UNREAD -INBOX");
        assert_eq!(label_change(&[], &["INBOX"]), "-INBOX");
    }

    #[test]
    fn test_modify_body_omits_empty_lists() {
        assert_eq!(
            modify_body(&[], &["UNREAD"]),
            json!({"removeLabelIds": ["UNREAD"]})
        );
        assert_eq!(
            modify_body(&["Label_1", "STARRED"], &[]),
            json!({"addLabelIds": ["Label_1", "STARRED"]})
        );
    }
}
