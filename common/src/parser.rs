//! Textract table parser
//!
//! Turns the first `TABLE` of a saved Textract `AnalyzeDocument` response into
//! sign-in rows. Row 1 is the header; every later table row becomes one
//! [`ExtractedRow`].

use crate::error::{Error, Result};
use crate::normalize::compact_id;
use crate::types::ExtractedRow;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

pub const NAME_COLUMN: &str = "Name";
pub const ID_COLUMN: &str = "EmployeeID";
pub const SIGNATURE_COLUMN: &str = "Signature";

/// Marker written for a ticked checkbox
const SELECTED_MARKER: &str = "[X]";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextractResponse {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Block {
    pub id: String,
    pub block_type: String,
    pub text: Option<String>,
    pub row_index: Option<usize>,
    pub column_index: Option<usize>,
    pub selection_status: Option<String>,
    pub relationships: Vec<Relationship>,
}

impl Block {
    fn children(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(|rel| rel.kind == "CHILD")
            .flat_map(|rel| rel.ids.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Relationship {
    #[serde(rename = "Type")]
    pub kind: String,
    pub ids: Vec<String>,
}

/// Extraction options
#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
    /// Drop rows where every cell is blank
    pub skip_blank_rows: bool,
}

/// Parse a Textract response from JSON text
pub fn parse_textract_json(json: &str, options: TableOptions) -> Result<Vec<ExtractedRow>> {
    let response: TextractResponse = serde_json::from_str(json)?;
    Ok(parse_textract_table(&response.blocks, options))
}

/// Rows of the first table; no table yields no rows
pub fn parse_textract_table(blocks: &[Block], options: TableOptions) -> Vec<ExtractedRow> {
    let by_id: HashMap<&str, &Block> = blocks.iter().map(|b| (b.id.as_str(), b)).collect();

    let Some(table) = blocks.iter().find(|b| b.block_type == "TABLE") else {
        return Vec::new();
    };

    let mut cells: HashMap<(usize, usize), String> = HashMap::new();
    let (mut max_row, mut max_col) = (0, 0);
    for child in table.children() {
        let Some(cell) = by_id.get(child).filter(|b| b.block_type == "CELL") else {
            continue;
        };
        let row = cell.row_index.unwrap_or(0);
        let col = cell.column_index.unwrap_or(0);
        max_row = max_row.max(row);
        max_col = max_col.max(col);
        cells.insert((row, col), cell_text(cell, &by_id));
    }

    let header: Vec<String> = (1..=max_col)
        .map(|col| header_key(cells.get(&(1, col)).map(String::as_str).unwrap_or(""), col))
        .collect();

    let mut rows = Vec::new();
    for r in 2..=max_row {
        let values: BTreeMap<String, String> = header
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let value = cells.get(&(r, i + 1)).map(|v| v.trim()).unwrap_or("");
                (key.clone(), value.to_string())
            })
            .collect();

        if options.skip_blank_rows && values.values().all(|v| v.is_empty()) {
            continue;
        }

        rows.push(row_from_cells(rows.len() + 1, values));
    }
    rows
}

fn row_from_cells(row_index: usize, mut values: BTreeMap<String, String>) -> ExtractedRow {
    let raw_name = values.remove(NAME_COLUMN).unwrap_or_default();
    let raw_id = values
        .remove(ID_COLUMN)
        .map(|id| compact_id(&id))
        .filter(|id| !id.is_empty());
    let signature_present = values
        .get(SIGNATURE_COLUMN)
        .map(|v| !v.is_empty())
        .unwrap_or(false);
    values.retain(|_, v| !v.is_empty());

    ExtractedRow {
        row_index,
        raw_name,
        raw_id,
        signature_present,
        attributes: values,
    }
}

/// Words of a cell joined by spaces; ticked boxes become `[X]`
fn cell_text(cell: &Block, by_id: &HashMap<&str, &Block>) -> String {
    cell.children()
        .filter_map(|id| by_id.get(id))
        .filter_map(|block| match block.block_type.as_str() {
            "WORD" => block.text.as_deref().filter(|t| !t.is_empty()),
            "SELECTION_ELEMENT" if block.selection_status.as_deref() == Some("SELECTED") => {
                Some(SELECTED_MARKER)
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Canonical column key for a header cell
pub fn header_key(raw: &str, column: usize) -> String {
    let header = raw.trim().to_lowercase();
    if header.is_empty() {
        return format!("Col{}", column);
    }
    if header.contains("name") {
        NAME_COLUMN.to_string()
    } else if header.contains("employee") && header.contains("id") {
        ID_COLUMN.to_string()
    } else if header.contains("room") {
        "RoomNumber".to_string()
    } else if header.contains("wake") {
        "Wake".to_string()
    } else if header.contains("sign") {
        SIGNATURE_COLUMN.to_string()
    } else {
        header.replace(' ', "")
    }
}

/// Whether a JSON document looks like a Textract response
pub fn is_textract_document(value: &serde_json::Value) -> bool {
    value.get("Blocks").map(|b| b.is_array()).unwrap_or(false)
}

/// Parse from an already decoded JSON value
pub fn parse_textract_value(value: serde_json::Value, options: TableOptions) -> Result<Vec<ExtractedRow>> {
    if !is_textract_document(&value) {
        return Err(Error::Parse("document has no Blocks array".into()));
    }
    let response: TextractResponse = serde_json::from_value(value)?;
    Ok(parse_textract_table(&response.blocks, options))
}
