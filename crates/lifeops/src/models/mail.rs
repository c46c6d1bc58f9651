//! Gmail messages and threads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single Gmail message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub thread_id: String,
    pub subject: String,
    /// Raw From header
    pub sender: String,
    pub recipients: Vec<String>,
    pub date: DateTime<Utc>,
    pub snippet: String,
    /// First text/plain body, trimmed
    pub body_plain: String,
    pub label_ids: Vec<String>,
}

impl EmailMessage {
    pub fn has_label(&self, label: &str) -> bool {
        self.label_ids.iter().any(|l| l == label)
    }

    pub fn is_unread(&self) -> bool {
        self.has_label("UNREAD")
    }

    pub fn is_important(&self) -> bool {
        self.has_label("IMPORTANT")
    }

    pub fn is_inbox(&self) -> bool {
        self.has_label("INBOX")
    }
}

/// A conversation, messages in thread order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailThread {
    pub id: String,
    pub subject: String,
    pub messages: Vec<EmailMessage>,
}

impl EmailThread {
    pub fn latest(&self) -> Option<&EmailMessage> {
        self.messages.last()
    }

    pub fn earliest(&self) -> Option<&EmailMessage> {
        self.messages.first()
    }

    /// Distinct senders in order of first appearance
    pub fn participants(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for message in &self.messages {
            if !seen.contains(&message.sender.as_str()) {
                seen.push(message.sender.as_str());
            }
        }
        seen
    }

    pub fn is_unread(&self) -> bool {
        self.messages.iter().any(EmailMessage::is_unread)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
