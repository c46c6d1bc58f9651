//! Outbound message construction

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

/// A message to send or save as a draft
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundMessage {
    pub to: Vec<String>,
    pub subject: String,
    /// Plain-text body, always included
    pub body: String,
    /// HTML alternative; makes the message multipart/alternative
    pub html_body: Option<String>,
    /// Gmail thread to file the message under
    pub thread_id: Option<String>,
    /// RFC 2822 Message-ID being replied to
    pub in_reply_to: Option<String>,
}

impl OutboundMessage {
    pub fn new<I, S>(to: I, subject: impl Into<String>, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            to: to.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn in_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn replying_to(mut self, message_id: impl Into<String>) -> Self {
        self.in_reply_to = Some(message_id.into());
        self
    }
}

const CRLF: &str = "\r\n";
const LINE_WIDTH: usize = 76;

/// Bytes of UTF-8 per encoded word, keeping each word under 75 characters
const ENCODED_WORD_CHUNK: usize = 45;

/// Serialize to RFC 2822 bytes with base64 bodies
pub fn build_outbound(message: &OutboundMessage) -> Vec<u8> {
    let mut out = String::new();

    match message.html_body.as_deref() {
        Some(html) => {
            let boundary = format!("=_lifeops_{}", uuid::Uuid::new_v4().as_simple());
            header(
                &mut out,
                "Content-Type",
                &format!("multipart/alternative; boundary=\"{}\"", boundary),
            );
            header(&mut out, "MIME-Version", "1.0");
            envelope(&mut out, message);
            out.push_str(CRLF);

            for (subtype, content) in [("plain", message.body.as_str()), ("html", html)] {
                out.push_str(&format!("--{}{}", boundary, CRLF));
                text_part(&mut out, subtype, content);
            }
            out.push_str(&format!("--{}--{}", boundary, CRLF));
        }
        None => {
            header(&mut out, "Content-Type", "text/plain; charset=\"utf-8\"");
            header(&mut out, "MIME-Version", "1.0");
            header(&mut out, "Content-Transfer-Encoding", "base64");
            envelope(&mut out, message);
            out.push_str(CRLF);
            base64_body(&mut out, &message.body);
        }
    }

    out.into_bytes()
}

/// Encode for the API's `raw` field: URL-safe alphabet, no padding
pub fn encode_raw(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn envelope(out: &mut String, message: &OutboundMessage) {
    header(out, "To", &message.to.join(", "));
    header(out, "From", "me");
    header(out, "Subject", &encode_header_text(&message.subject));
    if let Some(id) = message.in_reply_to.as_deref() {
        header(out, "In-Reply-To", id);
        header(out, "References", id);
    }
}

fn text_part(out: &mut String, subtype: &str, content: &str) {
    header(
        out,
        "Content-Type",
        &format!("text/{}; charset=\"utf-8\"", subtype),
    );
    header(out, "Content-Transfer-Encoding", "base64");
    out.push_str(CRLF);
    base64_body(out, content);
}

/// Header values never carry bare line breaks
fn header(out: &mut String, name: &str, value: &str) {
    let value: String = value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    out.push_str(name);
    out.push_str(": ");
    out.push_str(&value);
    out.push_str(CRLF);
}

fn base64_body(out: &mut String, content: &str) {
    let encoded = STANDARD.encode(content.as_bytes());
    // Base64 output is ASCII, so byte chunks are char boundaries
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push_str(CRLF);
    }
}

/// RFC 2047 encoded words for non-ASCII text, split on char boundaries.
/// Words are space-separated on one line; decoders drop the gap between them.
fn encode_header_text(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in text.chars() {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_CHUNK {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words.join(" ")
}

fn encoded_word(text: &str) -> String {
    format!("=?utf-8?b?{}?=", STANDARD.encode(text.as_bytes()))
}
