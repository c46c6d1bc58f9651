//! Docs and Slides

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleDoc {
    pub id: String,
    pub title: String,
    /// Extracted body text, trimmed at the outer boundary
    pub body_text: String,
    pub revision_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    /// 0-based position in the deck
    pub index: usize,
    pub text: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: String,
    pub title: String,
    pub slides: Vec<Slide>,
    pub url: String,
}

impl Presentation {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Every slide's text, one slide per line
    pub fn text(&self) -> String {
        self.slides
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
