//! Payload decoding

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One node of a Gmail message payload (`payload` or an entry of `parts`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagePart {
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "lenient")]
    pub part_id: String,
    #[serde(deserialize_with = "lenient")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "lenient")]
    pub filename: String,
    #[serde(deserialize_with = "lenient_vec")]
    pub headers: Vec<Header>,
    #[serde(deserialize_with = "lenient")]
    pub body: PartBody,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_vec")]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartBody {
    #[serde(deserialize_with = "lenient")]
    pub size: u64,
    /// URL-safe base64 content; absent for containers and attachments
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub attachment_id: Option<String>,
}

/// A field of the wrong shape falls back to its default instead of
/// failing the whole payload
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Entries that don't deserialize are dropped; their siblings are kept
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

impl MessagePart {
    /// MIME type without parameters, lower-cased
    pub fn essence(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn is_multipart(&self) -> bool {
        self.essence().starts_with("multipart/")
    }
}

/// URL-safe alphabet, any padding, non-canonical trailing bits tolerated
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 in either alphabet, ignoring whitespace and padding
pub fn decode_body_bytes(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    LENIENT_URL_SAFE.decode(normalized.trim_end_matches('='))
}

/// Decode body data to text.
///
/// Accepts URL-safe or standard alphabet, with or without padding, and
/// embedded whitespace. Invalid UTF-8 sequences become U+FFFD; data that
/// is not base64 at all decodes to a single U+FFFD.
pub fn decode_body_data(data: &str) -> String {
    match decode_body_bytes(data) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            log::debug!("Undecodable body data ({} chars): {}", data.len(), e);
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

/// First text/plain body found by depth-first search, or "" when there is none
pub fn decode_plain_text(part: &MessagePart) -> String {
    let essence = part.essence();
    if essence == "text/plain"
        && let Some(data) = part.body.data.as_deref()
        && !data.is_empty()
    {
        return decode_body_data(data);
    }

    if essence.starts_with("multipart/") {
        for child in &part.parts {
            let text = decode_plain_text(child);
            if !text.is_empty() {
                return text;
            }
        }
    }

    String::new()
}

/// Case-insensitive header lookup; a repeated header keeps its last value
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    values: HashMap<String, String>,
}

impl HeaderMap {
    pub fn from_headers(headers: &[Header]) -> Self {
        let values = headers
            .iter()
            .map(|h| (h.name.to_ascii_lowercase(), h.value.clone()))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }
}

/// Naive layouts seen in the wild, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a Date header; `None` when no known layout matches
pub fn try_parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // "Tue, 1 Jul 2025 10:00:00 +0000 (UTC)"
    let without_comment = match value.rfind('(') {
        Some(idx) if value.ends_with(')') => value[..idx].trim_end(),
        _ => value,
    };
    if let Ok(dt) = DateTime::parse_from_rfc2822(without_comment) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(without_comment) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(without_comment, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a Date header, falling back to the current time
pub fn parse_date(value: &str) -> DateTime<Utc> {
    try_parse_date(value).unwrap_or_else(|| {
        if !value.trim().is_empty() {
            log::debug!("Unparseable date {:?}, using now", value);
        }
        Utc::now()
    })
}

/// Split an address-list header on commas outside quotes and angle brackets
pub fn split_addresses(header: &str) -> Vec<String> {
    let mut addresses = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut angle_depth = 0usize;
    let mut escaped = false;

    for c in header.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => angle_depth += 1,
            '>' if !in_quotes => angle_depth = angle_depth.saturating_sub(1),
            ',' if !in_quotes && angle_depth == 0 => {
                addresses.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    addresses.push(current);

    addresses
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}
