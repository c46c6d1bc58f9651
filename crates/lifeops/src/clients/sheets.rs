//! Google Sheets values and tabs

use log::info;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use super::segment;
use crate::error::Result;
use crate::parse::Raw;
use crate::service::{ServiceCache, ServiceHandle};

/// How written values are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Parsed as if typed into the UI; formulas and dates work
    #[default]
    UserEntered,
    /// Stored as-is
    Raw,
}

impl ValueInputOption {
    pub fn as_api(&self) -> &'static str {
        match self {
            ValueInputOption::UserEntered => "USER_ENTERED",
            ValueInputOption::Raw => "RAW",
        }
    }
}

/// Cell colour, each channel in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Rgb {
    /// Default header background
    pub const DEEP_BLUE: Rgb = Rgb {
        red: 0.2,
        green: 0.35,
        blue: 0.7,
    };

    fn to_json(self) -> Value {
        json!({ "red": self.red, "green": self.green, "blue": self.blue })
    }
}

pub struct SheetsClient {
    service: Arc<ServiceHandle>,
}

impl SheetsClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.sheets()?,
        })
    }

    /// Cell values row by row; trailing empty cells are omitted by the API
    pub fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let response = self.service.get(&values_path(spreadsheet_id, range), &[])?;
        Ok(cell_rows(&response))
    }

    /// Rows keyed by the header row; short rows pad with ""
    pub fn read_as_maps(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<HashMap<String, String>>> {
        Ok(rows_to_maps(self.read_range(spreadsheet_id, range)?))
    }

    /// Overwrite `range` with `values`
    pub fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<()> {
        self.service.put(
            &values_path(spreadsheet_id, range),
            &[("valueInputOption", input.as_api())],
            &json!({ "values": values }),
        )?;
        info!("Wrote {} rows to {} in {}", values.len(), range, spreadsheet_id);
        Ok(())
    }

    /// Append below the last row with data; nothing is overwritten
    pub fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        rows: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<()> {
        let range = format!("{}!A1", sheet_name);
        self.service.post(
            &format!("{}:append", values_path(spreadsheet_id, &range)),
            &[
                ("valueInputOption", input.as_api()),
                ("insertDataOption", "INSERT_ROWS"),
            ],
            &json!({ "values": rows }),
        )?;
        info!("Appended {} rows to {}", rows.len(), sheet_name);
        Ok(())
    }

    /// Clear values; formatting stays
    pub fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        self.service.post(
            &format!("{}:clear", values_path(spreadsheet_id, range)),
            &[],
            &json!({}),
        )?;
        info!("Cleared range {}", range);
        Ok(())
    }

    pub fn list_sheet_names(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        let meta = self.metadata(spreadsheet_id)?;
        Ok(sheet_properties(&meta)
            .map(|props| props.str("title"))
            .collect())
    }

    /// Numeric id of a tab, needed by formatting requests
    pub fn get_sheet_id(&self, spreadsheet_id: &str, sheet_name: &str) -> Result<Option<i64>> {
        let meta = self.metadata(spreadsheet_id)?;
        Ok(sheet_properties(&meta)
            .find(|props| props.str("title") == sheet_name)
            .and_then(|props| props.value().get("sheetId").and_then(Value::as_i64)))
    }

    /// New spreadsheet with the given tabs ("Sheet1" when empty); returns its id
    pub fn create_spreadsheet(&self, title: &str, sheet_names: &[&str]) -> Result<String> {
        let names = if sheet_names.is_empty() {
            &["Sheet1"][..]
        } else {
            sheet_names
        };
        let sheets: Vec<Value> = names
            .iter()
            .map(|name| json!({ "properties": { "title": name } }))
            .collect();
        let response = self.service.post(
            "spreadsheets",
            &[],
            &json!({ "properties": { "title": title }, "sheets": sheets }),
        )?;
        let id = Raw::new("spreadsheet", &response).id("spreadsheetId")?;
        info!("Created spreadsheet {}: {}", id, title);
        Ok(id)
    }

    /// Bold white text on `background` (deep blue by default), rows up to
    /// and including the header frozen, first 20 columns auto-sized
    pub fn format_header_row(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        row_index: u32,
        background: Option<Rgb>,
    ) -> Result<()> {
        let background = background.unwrap_or(Rgb::DEEP_BLUE);
        let requests = header_format_requests(sheet_id, row_index, background);
        self.service.post(
            &format!("spreadsheets/{}:batchUpdate", segment(spreadsheet_id)),
            &[],
            &json!({ "requests": requests }),
        )?;
        info!("Formatted header row {} on sheet {}", row_index, sheet_id);
        Ok(())
    }

    fn metadata(&self, spreadsheet_id: &str) -> Result<Value> {
        self.service
            .get(&format!("spreadsheets/{}", segment(spreadsheet_id)), &[])
    }
}

fn header_format_requests(sheet_id: i64, row_index: u32, background: Rgb) -> Value {
    let end_row = row_index.saturating_add(1);
    json!([
        {
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": row_index,
                    "endRowIndex": end_row,
                },
                "cell": {
                    "userEnteredFormat": {
                        "textFormat": {
                            "bold": true,
                            "foregroundColor": { "red": 1, "green": 1, "blue": 1 },
                        },
                        "backgroundColor": background.to_json(),
                    }
                },
                "fields": "userEnteredFormat(textFormat,backgroundColor)",
            }
        },
        {
            "updateSheetProperties": {
                "properties": {
                    "sheetId": sheet_id,
                    "gridProperties": { "frozenRowCount": end_row },
                },
                "fields": "gridProperties.frozenRowCount",
            }
        },
        {
            "autoResizeDimensions": {
                "dimensions": {
                    "sheetId": sheet_id,
                    "dimension": "COLUMNS",
                    "startIndex": 0,
                    "endIndex": 20,
                }
            }
        }
    ])
}

fn values_path(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "spreadsheets/{}/values/{}",
        segment(spreadsheet_id),
        segment(range)
    )
}

fn sheet_properties(meta: &Value) -> impl Iterator<Item = Raw<'_>> {
    Raw::new("spreadsheet", meta)
        .arr("sheets")
        .iter()
        .map(|sheet| Raw::new("sheet", sheet).obj("properties"))
}

/// Formatted cell values as strings; numbers and booleans are stringified
fn cell_rows(response: &Value) -> Vec<Vec<String>> {
    Raw::new("values", response)
        .arr("values")
        .iter()
        .map(|row| {
            row.as_array()
                .map(|cells| cells.iter().map(cell_text).collect())
                .unwrap_or_default()
        })
        .collect()
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn rows_to_maps(rows: Vec<Vec<String>>) -> Vec<HashMap<String, String>> {
    let mut rows = rows.into_iter();
    let Some(headers) = rows.next() else {
        return Vec::new();
    };
    rows.map(|row| {
        headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect()
    })
    .collect()
}
