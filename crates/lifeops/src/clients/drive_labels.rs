//! Drive Labels: schema discovery and applying labels to files
//!
//! Label schemas come from the Drive Labels API; putting a label on a file
//! goes through Drive's `files.modifyLabels`. Listing schemas needs the
//! `drive.labels` scope, which personal accounts can't get, so a 403 there
//! surfaces as `Error::AccessRestricted`.

use log::info;
use serde_json::{Value, json};
use std::sync::Arc;

use super::segment;
use crate::error::{Error, Result};
use crate::models::DriveLabel;
use crate::parse::{self, Batch, Raw};
use crate::service::{ServiceCache, ServiceHandle};

const LABELS_API: &str = "Drive Labels";

pub struct DriveLabelsClient {
    labels: Arc<ServiceHandle>,
    drive: Arc<ServiceHandle>,
}

impl DriveLabelsClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            labels: cache.drive_labels()?,
            drive: cache.drive()?,
        })
    }

    /// Labels visible to the user, with display names in `language_code`
    pub fn list_labels(
        &self,
        published_only: bool,
        max_results: u32,
        language_code: &str,
    ) -> Result<Batch<DriveLabel>> {
        let page_size = max_results.to_string();
        let mut query = vec![
            ("pageSize", page_size.as_str()),
            ("languageCode", language_code),
            ("view", "LABEL_VIEW_FULL"),
        ];
        if published_only {
            query.push(("publishedOnly", "true"));
        }
        let response = self.labels.get("labels", &query).map_err(restricted)?;
        Ok(Batch::parse(
            Raw::new("labels", &response).arr("labels"),
            parse::label,
        ))
    }

    /// `name` is "labels/{id}", optionally with a revision ("labels/{id}@latest")
    pub fn get_label(&self, name: &str, language_code: &str) -> Result<DriveLabel> {
        let response = self
            .labels
            .get(
                &label_path(name),
                &[("view", "LABEL_VIEW_FULL"), ("languageCode", language_code)],
            )
            .map_err(restricted)?;
        parse::label(&response)
    }

    /// First published label whose title matches, ignoring case
    pub fn find_label_by_title(&self, title: &str) -> Result<Option<DriveLabel>> {
        Ok(self
            .list_labels(true, 50, "en")?
            .into_items()
            .into_iter()
            .find(|label| label.title.to_lowercase() == title.to_lowercase()))
    }

    /// Put a label on a file, setting text values on the given field ids
    pub fn apply_label(
        &self,
        file_id: &str,
        label_id: &str,
        field_values: &[(&str, &str)],
    ) -> Result<()> {
        self.modify_labels(file_id, &apply_modification(label_id, field_values))?;
        info!("Applied label {} to file {}", label_id, file_id);
        Ok(())
    }

    pub fn remove_label(&self, file_id: &str, label_id: &str) -> Result<()> {
        self.modify_labels(file_id, &remove_modification(label_id))?;
        info!("Removed label {} from file {}", label_id, file_id);
        Ok(())
    }

    /// Labels currently on a file, as the Drive API reports them
    pub fn get_file_labels(&self, file_id: &str) -> Result<Vec<Value>> {
        let response = self.drive.get(
            &format!("files/{}", segment(file_id)),
            &[("fields", "labelInfo"), ("includeLabels", "*")],
        )?;
        Ok(Raw::new("file", &response)
            .obj("labelInfo")
            .arr("labels")
            .to_vec())
    }

    fn modify_labels(&self, file_id: &str, modification: &Value) -> Result<()> {
        self.drive.post(
            &format!("files/{}/modifyLabels", segment(file_id)),
            &[],
            &json!({ "labelModifications": [modification] }),
        )?;
        Ok(())
    }
}

/// modifyLabels wants the bare id, not "labels/{id}"
fn bare_label_id(label_id: &str) -> &str {
    label_id.rsplit('/').next().unwrap_or(label_id)
}

fn label_path(name: &str) -> String {
    let id = name.strip_prefix("labels/").unwrap_or(name);
    format!("labels/{}", segment(id))
}

fn apply_modification(label_id: &str, field_values: &[(&str, &str)]) -> Value {
    let mut modification = json!({ "labelId": bare_label_id(label_id) });
    if !field_values.is_empty() {
        modification["fieldModifications"] = field_values
            .iter()
            .map(|(field_id, value)| {
                json!({
                    "fieldId": field_id,
                    "setTextValues": { "values": [value] },
                })
            })
            .collect();
    }
    modification
}

fn remove_modification(label_id: &str) -> Value {
    json!({ "labelId": bare_label_id(label_id), "removeLabel": true })
}

fn restricted(e: Error) -> Error {
    if e.is_permission_denied() {
        Error::AccessRestricted {
            api: LABELS_API.to_string(),
            message: "the drive.labels scope needs organization approval".to_string(),
        }
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_modification_with_fields() {
        assert_eq!(
            apply_modification("labels/abc123", &[("f1", "Active"), ("f2", "Q3")]),
            json!({
                "labelId": "abc123",
                "fieldModifications": [
                    {"fieldId": "f1", "setTextValues": {"values": ["Active"]}},
                    {"fieldId": "f2", "setTextValues": {"values": ["Q3"]}}
                ]
            })
        );
    }

    #[test]
    fn test_apply_modification_without_fields() {
        assert_eq!(apply_modification("abc123", &[]), json!({"labelId": "abc123"}));
    }

    #[test]
    fn test_remove_modification() {
        assert_eq!(
            remove_modification("labels/abc123"),
            json!({"labelId": "abc123", "removeLabel": true})
        );
    }

    #[test]
    fn test_label_path_keeps_revision() {
        assert_eq!(label_path("labels/abc@latest"), "labels/abc%40latest");
        assert_eq!(label_path("abc"), "labels/abc");
    }

    #[test]
    fn test_forbidden_becomes_access_restricted() {
        let err = restricted(Error::Api {
            status: 403,
            message: "Insufficient Permission".to_string(),
        });
        assert!(matches!(err, Error::AccessRestricted { ref api, .. } if api == LABELS_API));

        let err = restricted(Error::Api {
            status: 404,
            message: "missing".to_string(),
        });
        assert!(err.is_not_found());
    }
}
