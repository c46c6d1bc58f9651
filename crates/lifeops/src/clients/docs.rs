//! Docs: read, create, and edit documents

use log::info;
use serde_json::{Value, json};
use std::sync::Arc;

use super::segment;
use crate::error::Result;
use crate::models::GoogleDoc;
use crate::parse::{self, Raw};
use crate::service::{ServiceCache, ServiceHandle};

pub struct DocsClient {
    service: Arc<ServiceHandle>,
}

impl DocsClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.docs()?,
        })
    }

    pub fn get_document(&self, document_id: &str) -> Result<GoogleDoc> {
        parse::document(&self.fetch(document_id)?)
    }

    /// Plain text of the document body
    pub fn read_text(&self, document_id: &str) -> Result<String> {
        Ok(self.get_document(document_id)?.body_text)
    }

    /// Create a blank document and return its id
    pub fn create_document(&self, title: &str) -> Result<String> {
        let response = self
            .service
            .post("documents", &[], &json!({ "title": title }))?;
        let id = Raw::new("document", &response).id("documentId")?;
        info!("Created document {}: {}", id, title);
        Ok(id)
    }

    /// Append text on a new line at the end of the body
    pub fn append_text(&self, document_id: &str, text: &str) -> Result<()> {
        let index = end_index(&self.fetch(document_id)?);
        self.send_batch(
            document_id,
            vec![json!({
                "insertText": {
                    "location": { "index": index },
                    "text": format!("\n{}", text),
                }
            })],
        )?;
        info!("Appended {} chars to doc {}", text.len(), document_id);
        Ok(())
    }

    /// Replace every case-sensitive occurrence; returns how many changed
    pub fn replace_text(
        &self,
        document_id: &str,
        find: &str,
        replace_with: &str,
    ) -> Result<u64> {
        let response = self.send_batch(
            document_id,
            vec![json!({
                "replaceAllText": {
                    "containsText": { "text": find, "matchCase": true },
                    "replaceText": replace_with,
                }
            })],
        )?;
        let changed = response
            .pointer("/replies/0/replaceAllText/occurrencesChanged")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        info!(
            "Replaced {:?} -> {:?} in doc {} ({} changes)",
            find, replace_with, document_id, changed
        );
        Ok(changed)
    }

    /// Raw `documents.batchUpdate` for anything the helpers don't cover
    pub fn batch_update(&self, document_id: &str, requests: Vec<Value>) -> Result<Value> {
        let count = requests.len();
        let response = self.send_batch(document_id, requests)?;
        info!("Applied {} update requests to doc {}", count, document_id);
        Ok(response)
    }

    fn send_batch(&self, document_id: &str, requests: Vec<Value>) -> Result<Value> {
        self.service.post(
            &format!("documents/{}:batchUpdate", segment(document_id)),
            &[],
            &json!({ "requests": requests }),
        )
    }

    fn fetch(&self, document_id: &str) -> Result<Value> {
        self.service
            .get(&format!("documents/{}", segment(document_id)), &[])
    }
}

/// Insertion point just before the body's final newline
fn end_index(document: &Value) -> u64 {
    document
        .pointer("/body/content")
        .and_then(Value::as_array)
        .and_then(|content| content.last())
        .and_then(|last| last.get("endIndex"))
        .and_then(Value::as_u64)
        .map(|end| end.saturating_sub(1).max(1))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_index() {
        let doc = json!({"body": {"content": [
            {"endIndex": 1, "sectionBreak": {}},
            {"startIndex": 1, "endIndex": 42, "paragraph": {}}
        ]}});
        assert_eq!(end_index(&doc), 41);
    }

    #[test]
    fn test_end_index_of_empty_body() {
        assert_eq!(end_index(&json!({"body": {"content": []}})), 1);
        assert_eq!(end_index(&json!({})), 1);
    }
}
