//! Docs body: paragraphs, tables, and table-of-contents blocks

use serde_json::Value;

/// One block of a Docs body
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralElement {
    /// Text run contents in document order
    Paragraph(Vec<String>),
    /// Rows of cells
    Table(Vec<Vec<TableCell>>),
    TableOfContents(Vec<StructuralElement>),
    /// Section breaks and anything else without text
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub content: Vec<StructuralElement>,
}

impl StructuralElement {
    /// Dispatch on the marker key the API uses for each block kind
    pub fn from_value(value: &Value) -> Self {
        if let Some(paragraph) = value.get("paragraph") {
            let runs = array(paragraph, "elements")
                .filter_map(|element| element.get("textRun"))
                .map(|run| {
                    run.get("content")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect();
            return StructuralElement::Paragraph(runs);
        }

        if let Some(table) = value.get("table") {
            let rows = array(table, "tableRows")
                .map(|row| {
                    array(row, "tableCells")
                        .map(|cell| TableCell {
                            content: parse_content(cell),
                        })
                        .collect()
                })
                .collect();
            return StructuralElement::Table(rows);
        }

        if let Some(toc) = value.get("tableOfContents") {
            return StructuralElement::TableOfContents(parse_content(toc));
        }

        StructuralElement::Unsupported
    }
}

/// Iterate `value[key]` as an array; anything else is empty
fn array<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.as_slice())
        .unwrap_or_default()
        .iter()
}

/// Parse the `content` list of a body, cell, or TOC block
pub fn parse_content(container: &Value) -> Vec<StructuralElement> {
    array(container, "content")
        .map(StructuralElement::from_value)
        .collect()
}

/// Concatenate the text of a structural element list.
///
/// Paragraph runs are appended verbatim (they carry their own newlines).
/// Table cells and TOC blocks contribute only when their text is not blank.
pub fn extract_document_text(content: &[StructuralElement]) -> String {
    let mut out = String::new();
    append_text(content, &mut out);
    out
}

fn append_text(content: &[StructuralElement], out: &mut String) {
    for element in content {
        match element {
            StructuralElement::Paragraph(runs) => {
                for run in runs {
                    out.push_str(run);
                }
            }
            StructuralElement::Table(rows) => {
                for cell in rows.iter().flatten() {
                    append_non_blank(&cell.content, out);
                }
            }
            StructuralElement::TableOfContents(content) => append_non_blank(content, out),
            StructuralElement::Unsupported => {}
        }
    }
}

fn append_non_blank(content: &[StructuralElement], out: &mut String) {
    let text = extract_document_text(content);
    if !text.trim().is_empty() {
        out.push_str(&text);
    }
}

/// Text of a whole `documents.get` response (`body.content`)
pub fn body_text(document: &Value) -> String {
    let content = document
        .get("body")
        .map(parse_content)
        .unwrap_or_default();
    extract_document_text(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paragraph(runs: &[&str]) -> Value {
        let elements: Vec<Value> = runs
            .iter()
            .map(|r| json!({"startIndex": 1, "textRun": {"content": r, "textStyle": {}}}))
            .collect();
        json!({"paragraph": {"elements": elements}})
    }

    #[test]
    fn test_paragraph_runs_concatenate() {
        let body = json!({"content": [paragraph(&["Hello", " world\n"])]});
        assert_eq!(extract_document_text(&parse_content(&body)), "Hello world\n");
    }

    #[test]
    fn test_blank_table_contributes_nothing() {
        let body = json!({"content": [
            paragraph(&["Before\n"]),
            {"table": {"tableRows": [
                {"tableCells": [{"content": [paragraph(&["  \n"])]}, {"content": []}]}
            ]}},
            paragraph(&["After\n"]),
        ]});
        assert_eq!(extract_document_text(&parse_content(&body)), "Before\nAfter\n");
    }

    #[test]
    fn test_table_cells_and_toc_recurse() {
        let body = json!({"content": [
            {"tableOfContents": {"content": [paragraph(&["Intro\n"])]}},
            {"table": {"tableRows": [
                {"tableCells": [
                    {"content": [paragraph(&["a\n"])]},
                    {"content": [{"table": {"tableRows": [
                        {"tableCells": [{"content": [paragraph(&["nested\n"])]}]}
                    ]}}]},
                ]}
            ]}},
        ]});
        assert_eq!(
            extract_document_text(&parse_content(&body)),
            "Intro\na\nnested\n"
        );
    }

    #[test]
    fn test_unsupported_and_non_text_runs_are_skipped() {
        let body = json!({"content": [
            {"sectionBreak": {"sectionStyle": {}}},
            {"paragraph": {"elements": [
                {"inlineObjectElement": {"inlineObjectId": "kix.1"}},
                {"textRun": {"content": "text\n"}},
            ]}},
        ]});
        let content = parse_content(&body);
        assert_eq!(content[0], StructuralElement::Unsupported);
        assert_eq!(extract_document_text(&content), "text\n");
    }

    #[test]
    fn test_body_text_tolerates_missing_body() {
        assert_eq!(body_text(&json!({"documentId": "d"})), "");
        assert_eq!(body_text(&json!({"body": {"content": "oops"}})), "");
    }
}
