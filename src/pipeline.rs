//! Run orchestration
//!
//! Load the directory once, then reconcile any number of sheets against that
//! snapshot. All failures surface before a sheet is matched; once matching
//! starts every row gets a result.

use crate::directory::{snapshot_digest, ReferenceDirectory};
use crate::error::{ReconError, Result};
use crate::extractor::{load_rows, SheetInput};
use crate::report::{ReportContext, SheetReport};
use chrono::NaiveDate;
use signin_recon_common::{ConfidenceBands, Matcher, ReferenceSet, TableOptions};
use std::path::Path;
use tracing::info;

/// Validated, read-only directory for one run
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub reference: ReferenceSet,
    pub digest: String,
    pub description: String,
}

impl Snapshot {
    pub fn context(&self, matcher: &Matcher, bands: ConfidenceBands) -> ReportContext {
        ReportContext {
            directory: self.description.clone(),
            reference_digest: self.digest.clone(),
            threshold: matcher.options().name_match_threshold,
            bands,
        }
    }
}

/// Load and validate the directory
///
/// `ReferenceUnavailable` when the source cannot be read, `InvalidInput` when
/// it holds duplicate ids.
pub fn load_snapshot(directory: &dyn ReferenceDirectory) -> Result<Snapshot> {
    let entities = directory.load()?;
    let digest = snapshot_digest(&entities);
    let reference = ReferenceSet::new(entities)?;
    info!(
        entities = reference.len(),
        digest = %digest,
        "directory snapshot ready"
    );
    Ok(Snapshot {
        reference,
        digest,
        description: directory.describe(),
    })
}

/// Sheet details given on the command line; they win over the file's own
#[derive(Debug, Clone, Default)]
pub struct SheetOverrides {
    pub date: Option<String>,
    pub sheet_id: Option<String>,
}

impl SheetOverrides {
    pub fn apply(&self, sheet: &mut SheetInput) -> Result<()> {
        if let Some(date) = &self.date {
            sheet.sheet_date = Some(date.clone());
        }
        if let Some(id) = &self.sheet_id {
            sheet.sheet_id = Some(id.clone());
        }
        if let Some(date) = &sheet.sheet_date {
            validate_date(date)?;
        }
        Ok(())
    }
}

pub fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ReconError::InvalidDate(date.to_string()))
}

/// Match one loaded sheet and build its report
pub fn reconcile_sheet(
    source: &str,
    sheet: &SheetInput,
    snapshot: &Snapshot,
    matcher: &Matcher,
    context: &ReportContext,
) -> SheetReport {
    let outcome = matcher.match_snapshot(&sheet.rows, &snapshot.reference);
    info!(
        sheet = source,
        total = outcome.summary.total_rows,
        matched = outcome.summary.matched_rows,
        "sheet reconciled"
    );
    SheetReport::build(source, sheet, outcome, &snapshot.reference, context)
}

/// Load a sheet file, then reconcile it
pub fn reconcile_file(
    path: &Path,
    snapshot: &Snapshot,
    matcher: &Matcher,
    context: &ReportContext,
    table: TableOptions,
    overrides: &SheetOverrides,
) -> Result<SheetReport> {
    let mut sheet = load_rows(path, table)?;
    overrides.apply(&mut sheet)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(reconcile_sheet(&source, &sheet, snapshot, matcher, context))
}

/// File stem used for report names
pub fn report_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sheet".to_string())
}
