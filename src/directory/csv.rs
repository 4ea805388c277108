//! CSV directory exports (header row with id and name columns)

use super::{entities_from_table, unavailable};
use crate::error::Result;
use signin_recon_common::ReferenceEntity;
use std::path::Path;

pub fn load(path: &Path) -> Result<Vec<ReferenceEntity>> {
    let content = std::fs::read_to_string(path).map_err(|e| unavailable(path, &e.to_string()))?;
    let content = content.trim_start_matches('\u{feff}');
    let rows = split_records(content)
        .into_iter()
        .filter(|record| record.iter().any(|field| !field.trim().is_empty()));
    entities_from_table(path, rows)
}

/// Split CSV text into records
///
/// Quoted fields may hold commas, line breaks and `""` escapes. `\r\n` and `\n`
/// both end a record outside quotes.
fn split_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => record.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
