//! Slides: read decks and add slides

use log::info;
use serde_json::{Value, json};
use std::sync::Arc;

use super::segment;
use crate::error::Result;
use crate::models::Presentation;
use crate::parse::{self, Raw};
use crate::service::{ServiceCache, ServiceHandle};

pub struct SlidesClient {
    service: Arc<ServiceHandle>,
}

impl SlidesClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.slides()?,
        })
    }

    pub fn get_presentation(&self, presentation_id: &str) -> Result<Presentation> {
        let response = self
            .service
            .get(&format!("presentations/{}", segment(presentation_id)), &[])?;
        parse::presentation(&response)
    }

    /// One string per slide, in order
    pub fn get_text_content(&self, presentation_id: &str) -> Result<Vec<String>> {
        Ok(self
            .get_presentation(presentation_id)?
            .slides
            .into_iter()
            .map(|s| s.text)
            .collect())
    }

    pub fn create_presentation(&self, title: &str) -> Result<String> {
        let response = self
            .service
            .post("presentations", &[], &json!({ "title": title }))?;
        let id = Raw::new("presentation", &response).id("presentationId")?;
        info!("Created presentation {}: {}", id, title);
        Ok(id)
    }

    /// Insert a slide with a predefined layout ("BLANK", "TITLE_AND_BODY", ...).
    /// `insertion_index` of `None` appends. Returns the new slide's object id.
    pub fn add_slide(
        &self,
        presentation_id: &str,
        layout: &str,
        insertion_index: Option<u32>,
    ) -> Result<String> {
        let response = self.send_batch(
            presentation_id,
            vec![create_slide_request(layout, insertion_index)],
        )?;
        let slide_id = response
            .pointer("/replies/0/createSlide/objectId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        info!("Added slide {} to presentation {}", slide_id, presentation_id);
        Ok(slide_id)
    }

    /// Insert text at the start of an existing shape
    pub fn add_text_to_slide(
        &self,
        presentation_id: &str,
        shape_id: &str,
        text: &str,
    ) -> Result<()> {
        self.send_batch(
            presentation_id,
            vec![json!({
                "insertText": {
                    "objectId": shape_id,
                    "text": text,
                    "insertionIndex": 0,
                }
            })],
        )?;
        info!("Inserted {} chars into shape {}", text.len(), shape_id);
        Ok(())
    }

    pub fn batch_update(&self, presentation_id: &str, requests: Vec<Value>) -> Result<Value> {
        let count = requests.len();
        let response = self.send_batch(presentation_id, requests)?;
        info!("Applied {} update requests to presentation {}", count, presentation_id);
        Ok(response)
    }

    fn send_batch(&self, presentation_id: &str, requests: Vec<Value>) -> Result<Value> {
        self.service.post(
            &format!("presentations/{}:batchUpdate", segment(presentation_id)),
            &[],
            &json!({ "requests": requests }),
        )
    }
}

fn create_slide_request(layout: &str, insertion_index: Option<u32>) -> Value {
    let mut request = json!({
        "slideLayoutReference": { "predefinedLayout": layout }
    });
    if let Some(index) = insertion_index {
        request["insertionIndex"] = json!(index);
    }
    json!({ "createSlide": request })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_slide_request() {
        assert_eq!(
            create_slide_request("BLANK", None),
            json!({"createSlide": {"slideLayoutReference": {"predefinedLayout": "BLANK"}}})
        );
        assert_eq!(
            create_slide_request("TITLE", Some(2))["createSlide"]["insertionIndex"],
            2
        );
    }
}
