use serde_json::Value;

use super::Raw;
use crate::error::{Error, Result};
use crate::extract::{Page, body_text, slide_text, speaker_notes};
use crate::models::{GoogleDoc, Presentation, Slide};

/// `documents.get`
pub fn document(value: &Value) -> Result<GoogleDoc> {
    let raw = Raw::new("document", value);
    let id = raw.id("documentId")?;
    Ok(GoogleDoc {
        url: format!("https://docs.google.com/document/d/{}/edit", id),
        id,
        title: raw.str("title"),
        body_text: body_text(value).trim().to_string(),
        revision_id: raw.str("revisionId"),
    })
}

/// `presentations.get`; every slide must carry its objectId
pub fn presentation(value: &Value) -> Result<Presentation> {
    let raw = Raw::new("presentation", value);
    let id = raw.id("presentationId")?;

    let slides = raw
        .arr("slides")
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let slide_id = Raw::new("slide", page).id("objectId")?;
            let page = Page::from_value(page);
            Ok(Slide {
                id: slide_id,
                index,
                text: slide_text(&page),
                notes: speaker_notes(&page),
            })
        })
        .collect::<std::result::Result<Vec<_>, Error>>()?;

    Ok(Presentation {
        url: format!("https://docs.google.com/presentation/d/{}/edit", id),
        id,
        title: raw.str("title"),
        slides,
    })
}
