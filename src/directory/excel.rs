//! Spreadsheet directory exports (xlsx / xls / ods)

use super::{entities_from_table, unavailable};
use crate::error::Result;
use calamine::{open_workbook_auto, Reader};
use signin_recon_common::ReferenceEntity;
use std::path::Path;

pub fn load(path: &Path, sheet: Option<&str>) -> Result<Vec<ReferenceEntity>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| unavailable(path, &e.to_string()))?;

    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .map_err(|e| unavailable(path, &format!("sheet \"{}\": {}", name, e)))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| unavailable(path, "workbook has no sheets"))?
            .map_err(|e| unavailable(path, &e.to_string()))?,
    };

    // numeric ids come back as floats; Display prints 1042823.0 as "1042823"
    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    entities_from_table(path, rows)
}
