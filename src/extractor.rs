//! Sheet input
//!
//! A sheet file is JSON in one of three shapes:
//! - a saved Textract `AnalyzeDocument` response (`{"Blocks": [...]}`)
//! - a plain array of rows
//! - a rows document `{"sheetDate", "sheetId", "rows": [...]}`

use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use signin_recon_common::parser::is_textract_document;
use signin_recon_common::{parse_textract_value, Error, ExtractedRow, TableOptions};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Rows of one sheet plus what is known about the sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    pub rows: Vec<ExtractedRow>,
}

/// On-disk rows document; `rows` absent or null is a malformed batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowsDocument {
    #[serde(default)]
    sheet_date: Option<String>,
    #[serde(default)]
    sheet_id: Option<String>,
    #[serde(default)]
    rows: Option<Vec<ExtractedRow>>,
}

pub fn load_rows(path: &Path, options: TableOptions) -> Result<SheetInput> {
    if !path.is_file() {
        return Err(ReconError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_rows(&content, options)
}

pub fn parse_rows(content: &str, options: TableOptions) -> Result<SheetInput> {
    let value: Value = serde_json::from_str(content)?;

    let mut sheet = if is_textract_document(&value) {
        SheetInput {
            rows: parse_textract_value(value, options)?,
            ..Default::default()
        }
    } else if value.is_array() {
        SheetInput {
            rows: serde_json::from_value(value)?,
            ..Default::default()
        }
    } else if value.is_object() {
        let document: RowsDocument = serde_json::from_value(value)?;
        let rows = document.rows.ok_or_else(|| {
            Error::InvalidInput("sheet document has no row collection (\"rows\" missing or null)".into())
        })?;
        SheetInput {
            sheet_date: document.sheet_date,
            sheet_id: document.sheet_id,
            rows,
        }
    } else {
        return Err(Error::InvalidInput("sheet file must hold a JSON array or object".into()).into());
    };

    number_rows(&mut sheet.rows)?;
    debug!(rows = sheet.rows.len(), "sheet rows loaded");
    Ok(sheet)
}

/// Rows without an index follow the row before them (the first gets 1);
/// the resulting indices must be unique
fn number_rows(rows: &mut [ExtractedRow]) -> Result<()> {
    let mut previous = 0;
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows.iter_mut() {
        if row.row_index == 0 {
            row.row_index = previous + 1;
        }
        if !seen.insert(row.row_index) {
            return Err(Error::InvalidInput(format!("duplicate row index {}", row.row_index)).into());
        }
        previous = row.row_index;
    }
    Ok(())
}

/// Sheet files (`*.json`) directly inside a folder, by file name
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ReconError::FolderNotFound(folder.display().to_string()));
    }

    let mut sheets: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_sheet_file(path))
        .collect();

    sheets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sheets)
}

fn is_sheet_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    // reports written next to the sheets end in .report.json
    let is_report = path
        .file_name()
        .map(|name| name.to_string_lossy().ends_with(".report.json"))
        .unwrap_or(false);
    is_json && !is_report
}
