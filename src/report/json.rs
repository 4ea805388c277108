use super::SheetReport;
use crate::error::Result;
use std::path::Path;

pub fn write_json(report: &SheetReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
