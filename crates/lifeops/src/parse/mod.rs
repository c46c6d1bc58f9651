//! Raw API responses to typed entities
//!
//! Parsers are pure and tolerant: missing or differently-shaped optional
//! fields take defaults. Only a resource's own identity field is required;
//! its absence is `Error::MalformedResponse`. Lists go through [`Batch`] so
//! one malformed item never sinks its siblings.

mod calendar;
mod docs;
mod drive;
mod gmail;
mod keep;
mod meet;
mod people;
mod tasks;

pub use calendar::event;
pub use docs::{document, presentation};
pub use drive::{FILE_FIELDS, file, label};
pub use gmail::{label_map, message, thread};
pub use keep::note;
pub use meet::space;
pub use people::{PERSON_FIELDS, person};
pub use tasks::{task, tasklist};

use chrono::{DateTime, Utc};
use log::warn;
use serde_json::Value;

use crate::error::{Error, Result};

static NULL: Value = Value::Null;

/// Read-only view over one raw resource
#[derive(Clone, Copy)]
pub struct Raw<'a> {
    resource: &'static str,
    value: &'a Value,
}

impl<'a> Raw<'a> {
    pub fn new(resource: &'static str, value: &'a Value) -> Self {
        Self { resource, value }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Required identity field: a non-empty string
    pub fn id(&self, field: &str) -> Result<String> {
        match self.value.get(field).and_then(Value::as_str) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(Error::malformed(self.resource, field)),
        }
    }

    pub fn opt_str(&self, field: &str) -> Option<String> {
        self.value
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn str(&self, field: &str) -> String {
        self.opt_str(field).unwrap_or_default()
    }

    pub fn str_or(&self, field: &str, default: &str) -> String {
        self.opt_str(field).unwrap_or_else(|| default.to_string())
    }

    pub fn bool(&self, field: &str) -> bool {
        self.value
            .get(field)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Array field; anything else is empty
    pub fn arr(&self, field: &str) -> &'a [Value] {
        self.value
            .get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Nested object; a missing field reads as an empty object
    pub fn obj(&self, field: &str) -> Raw<'a> {
        Raw {
            resource: self.resource,
            value: self.value.get(field).unwrap_or(&NULL),
        }
    }

    /// RFC 3339 timestamp; `None` when absent or unparseable
    pub fn time(&self, field: &str) -> Option<DateTime<Utc>> {
        parse_rfc3339(self.value.get(field).and_then(Value::as_str)?)
    }
}

pub(crate) fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// An item that could not be parsed or fetched
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub id: Option<String>,
    pub reason: String,
}

/// Parsed items plus the ones that were skipped
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Batch<T> {
    /// Parse every element of a raw list, skipping failures
    pub fn parse(values: &[Value], parser: impl Fn(&Value) -> Result<T>) -> Self {
        Self::from_results(values.iter().map(|value| {
            let id = value.get("id").and_then(Value::as_str).map(str::to_string);
            (id, parser(value))
        }))
    }

    /// Collect per-item outcomes; each failure is logged and recorded
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Result<T>)>,
    {
        let mut batch = Self::default();
        for (id, result) in results {
            match result {
                Ok(item) => batch.items.push(item),
                Err(e) => {
                    warn!("Skipping {}: {}", id.as_deref().unwrap_or("item"), e);
                    batch.skipped.push(Skipped {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
