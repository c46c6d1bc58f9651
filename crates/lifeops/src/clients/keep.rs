//! Google Keep notes
//!
//! Keep's API is only open to Workspace accounts. Consumer accounts get a
//! 403 on every call, which surfaces as `Error::AccessRestricted`.

use log::info;
use serde_json::json;
use std::sync::Arc;

use super::segment;
use crate::error::{Error, Result};
use crate::models::KeepNote;
use crate::parse::{self, Batch, Raw};
use crate::service::{ServiceCache, ServiceHandle};

const KEEP_API: &str = "Google Keep";

pub struct KeepClient {
    service: Arc<ServiceHandle>,
}

impl KeepClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.keep()?,
        })
    }

    pub fn list_notes(&self, max_results: u32, include_trashed: bool) -> Result<Batch<KeepNote>> {
        let page_size = max_results.to_string();
        let mut query = vec![("pageSize", page_size.as_str())];
        if !include_trashed {
            query.push(("filter", "-trashed"));
        }
        let response = self.service.get("notes", &query).map_err(restricted)?;
        Ok(Batch::from_results(
            Raw::new("notes", &response)
                .arr("notes")
                .iter()
                .map(|n| (Raw::new("note", n).opt_str("name"), parse::note(n))),
        ))
    }

    /// `name` is "notes/{id}"
    pub fn get_note(&self, name: &str) -> Result<KeepNote> {
        let response = self
            .service
            .get(&note_path(name), &[])
            .map_err(restricted)?;
        parse::note(&response)
    }

    pub fn create_note(&self, title: &str, text: &str) -> Result<KeepNote> {
        let body = json!({
            "title": title,
            "body": { "text": { "text": text } },
        });
        let response = self.service.post("notes", &[], &body).map_err(restricted)?;
        let note = parse::note(&response)?;
        info!("Created note {}", note.name);
        Ok(note)
    }

    pub fn delete_note(&self, name: &str) -> Result<()> {
        self.service.delete(&note_path(name)).map_err(restricted)?;
        info!("Deleted note {}", name);
        Ok(())
    }
}

fn note_path(name: &str) -> String {
    let id = name.strip_prefix("notes/").unwrap_or(name);
    format!("notes/{}", segment(id))
}

fn restricted(e: Error) -> Error {
    if e.is_permission_denied() {
        Error::AccessRestricted {
            api: KEEP_API.to_string(),
            message: "the Keep API requires a Google Workspace account".to_string(),
        }
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_becomes_access_restricted() {
        let err = restricted(Error::Api {
            status: 403,
            message: "The caller does not have permission".to_string(),
        });
        assert!(matches!(err, Error::AccessRestricted { ref api, .. } if api == KEEP_API));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = restricted(Error::Api {
            status: 500,
            message: "backend".to_string(),
        });
        assert!(matches!(err, Error::Api { status: 500, .. }));
    }

    #[test]
    fn test_note_path_accepts_bare_and_prefixed() {
        assert_eq!(note_path("notes/abc"), "notes/abc");
        assert_eq!(note_path("abc"), "notes/abc");
    }
}
