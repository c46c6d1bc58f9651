//! Slides pages: shapes, groups, and speaker notes

use serde_json::Value;

/// Placeholder type holding the speaker notes on a notes page
pub const PLACEHOLDER_BODY: &str = "BODY";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub object_id: String,
    pub elements: Vec<PageElement>,
    pub notes: Option<Box<Page>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageElement {
    Shape(Shape),
    Group(Vec<PageElement>),
    /// Images, tables, charts, lines, video
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    /// Placeholder type such as "TITLE" or "BODY"
    pub placeholder: Option<String>,
    pub text_runs: Vec<String>,
}

impl Page {
    pub fn from_value(value: &Value) -> Self {
        let notes = value
            .pointer("/slideProperties/notesPage")
            .map(|notes| Box::new(Page::from_value(notes)));
        Self {
            object_id: value
                .get("objectId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            elements: elements(value, "pageElements"),
            notes,
        }
    }
}

fn elements(value: &Value, key: &str) -> Vec<PageElement> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(PageElement::from_value).collect())
        .unwrap_or_default()
}

impl PageElement {
    pub fn from_value(value: &Value) -> Self {
        if let Some(shape) = value.get("shape") {
            let placeholder = shape
                .pointer("/placeholder/type")
                .and_then(Value::as_str)
                .map(str::to_string);
            let text_runs = shape
                .pointer("/text/textElements")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|te| te.pointer("/textRun/content").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            return PageElement::Shape(Shape {
                placeholder,
                text_runs,
            });
        }

        if let Some(group) = value.get("elementGroup") {
            return PageElement::Group(elements(group, "children"));
        }

        PageElement::Unsupported
    }
}

fn collect_runs<'a>(
    elements: &'a [PageElement],
    keep: &dyn Fn(&Shape) -> bool,
    out: &mut Vec<&'a str>,
) {
    for element in elements {
        match element {
            PageElement::Shape(shape) if keep(shape) => {
                out.extend(
                    shape
                        .text_runs
                        .iter()
                        .map(|run| run.trim())
                        .filter(|run| !run.is_empty()),
                );
            }
            PageElement::Group(children) => collect_runs(children, keep, out),
            PageElement::Shape(_) | PageElement::Unsupported => {}
        }
    }
}

/// Every non-empty run on the slide, trimmed and joined by single spaces
pub fn slide_text(page: &Page) -> String {
    let mut runs = Vec::new();
    collect_runs(&page.elements, &|_| true, &mut runs);
    runs.join(" ")
}

/// Speaker notes: runs of BODY placeholders on the notes page
pub fn speaker_notes(page: &Page) -> String {
    let Some(notes) = page.notes.as_deref() else {
        return String::new();
    };
    let mut runs = Vec::new();
    collect_runs(
        &notes.elements,
        &|shape| shape.placeholder.as_deref() == Some(PLACEHOLDER_BODY),
        &mut runs,
    );
    runs.join(" ")
}
