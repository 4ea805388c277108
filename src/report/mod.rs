//! Reconciliation reports
//!
//! One [`SheetReport`] per sheet, rendered to the console, JSON or Excel.

pub mod console;
pub mod excel;
pub mod json;

use crate::error::Result;
use crate::extractor::SheetInput;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use signin_recon_common::{
    BatchOutcome, BatchSummary, ConfidenceBands, MatchResult, ReconStats, ReferenceSet, RowStatus,
};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Console only
    #[default]
    Text,
    Json,
    Excel,
    /// Console, JSON and Excel
    All,
}

impl ReportFormat {
    pub fn wants_text(&self) -> bool {
        matches!(self, ReportFormat::Text | ReportFormat::All)
    }

    pub fn wants_json(&self) -> bool {
        matches!(self, ReportFormat::Json | ReportFormat::All)
    }

    pub fn wants_excel(&self) -> bool {
        matches!(self, ReportFormat::Excel | ReportFormat::All)
    }
}

/// Run-wide facts shared by every sheet report
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub directory: String,
    pub reference_digest: String,
    pub threshold: f64,
    pub bands: ConfidenceBands,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(flatten)]
    pub result: MatchResult,
    pub matched_name: Option<String>,
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReport {
    pub source: String,
    pub sheet_date: Option<String>,
    pub sheet_id: Option<String>,
    pub directory: String,
    pub reference_digest: String,
    pub reference_size: usize,
    pub threshold: f64,
    pub generated_at: String,
    pub summary: BatchSummary,
    pub stats: ReconStats,
    pub rows: Vec<ReportRow>,
}

impl SheetReport {
    pub fn build(
        source: &str,
        sheet: &SheetInput,
        outcome: BatchOutcome,
        reference: &ReferenceSet,
        context: &ReportContext,
    ) -> Self {
        let stats = ReconStats::compute(&outcome, reference, &context.bands);
        let BatchOutcome { results, summary } = outcome;

        let rows = results
            .into_iter()
            .map(|result| {
                let matched_name = result
                    .matched_entity_id
                    .as_deref()
                    .and_then(|id| reference.get(id))
                    .map(|entity| entity.name.clone());
                let status = RowStatus::of(&result, &context.bands);
                ReportRow {
                    result,
                    matched_name,
                    status,
                }
            })
            .collect();

        Self {
            source: source.to_string(),
            sheet_date: sheet.sheet_date.clone(),
            sheet_id: sheet.sheet_id.clone(),
            directory: context.directory.clone(),
            reference_digest: context.reference_digest.clone(),
            reference_size: reference.len(),
            threshold: context.threshold,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            summary,
            stats,
            rows,
        }
    }
}

/// Write the file outputs a format asks for; returns the written paths
pub fn write_reports(
    report: &SheetReport,
    format: ReportFormat,
    output_dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !(format.wants_json() || format.wants_excel()) {
        return Ok(written);
    }

    std::fs::create_dir_all(output_dir)?;

    if format.wants_json() {
        let path = output_dir.join(format!("{}.report.json", stem));
        json::write_json(report, &path)?;
        written.push(path);
    }
    if format.wants_excel() {
        let path = output_dir.join(format!("{}.report.xlsx", stem));
        excel::write_excel(report, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use signin_recon_common::{ExtractedRow, Matcher, ReferenceEntity};

    pub fn sample_report() -> SheetReport {
        let reference = ReferenceSet::new(vec![
            ReferenceEntity::new("1042823", "Jeremy Dickamore"),
            ReferenceEntity::new("5001", "Ann Lee"),
            ReferenceEntity::new("6002", "Bob Ray"),
        ])
        .unwrap();
        let sheet = SheetInput {
            sheet_date: Some("2025-03-01".into()),
            sheet_id: Some("A1".into()),
            rows: vec![
                ExtractedRow::new(1, "Jermey Dickamorc", Some("1042823")),
                ExtractedRow::new(2, "Ann Leee", None),
                ExtractedRow::new(3, "Zzyzx Qwerty", None),
            ],
        };
        let outcome = Matcher::default().sequential().match_snapshot(&sheet.rows, &reference);
        let context = ReportContext {
            directory: "staff.csv".into(),
            reference_digest: "abc".into(),
            threshold: 0.6,
            bands: ConfidenceBands::default(),
        };
        SheetReport::build("sheet.json", &sheet, outcome, &reference, &context)
    }
}
