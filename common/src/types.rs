//! Reconciliation data model
//!
//! - ExtractedRow: one OCR-derived sign-in row
//! - ReferenceEntity: one trusted directory record
//! - MatchResult: decision for one row
//! - BatchSummary: aggregate over a batch

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row read from a sign-in sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRow {
    /// 1-based position within the batch
    #[serde(default)]
    pub row_index: usize,

    #[serde(default, alias = "name")]
    pub raw_name: String,

    #[serde(default, alias = "employeeId", alias = "id")]
    pub raw_id: Option<String>,

    #[serde(default)]
    pub signature_present: bool,

    /// Remaining sheet columns (RoomNumber, Wake, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ExtractedRow {
    pub fn new(row_index: usize, raw_name: impl Into<String>, raw_id: Option<&str>) -> Self {
        Self {
            row_index,
            raw_name: raw_name.into(),
            raw_id: raw_id.map(str::to_string),
            ..Default::default()
        }
    }

    /// Identifier with surrounding whitespace removed, `None` when blank
    pub fn normalized_id(&self) -> Option<&str> {
        self.raw_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Trusted directory record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub id: String,
    pub name: String,
}

impl ReferenceEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Which tier produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchMethod {
    Id,
    Name,
    None,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::Id => write!(f, "ID"),
            MatchMethod::Name => write!(f, "NAME"),
            MatchMethod::None => write!(f, "NONE"),
        }
    }
}

/// Decision for one row
///
/// Built through [`MatchResult::by_id`], [`MatchResult::by_name`] and
/// [`MatchResult::unmatched`] so that `matched_entity_id` is absent exactly
/// when the method is `None`, and an ID match always carries confidence 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub row_index: usize,
    pub raw_name: String,
    pub raw_id: Option<String>,
    pub matched_entity_id: Option<String>,
    pub match_method: MatchMethod,
    pub confidence: f64,
}

impl MatchResult {
    pub fn by_id(row: &ExtractedRow, entity_id: &str) -> Self {
        Self::from_row(row, Some(entity_id.to_string()), MatchMethod::Id, 1.0)
    }

    pub fn by_name(row: &ExtractedRow, entity_id: &str, score: f64) -> Self {
        Self::from_row(row, Some(entity_id.to_string()), MatchMethod::Name, score)
    }

    /// No acceptable match; `best_score` is the near-miss kept for diagnostics
    pub fn unmatched(row: &ExtractedRow, best_score: f64) -> Self {
        Self::from_row(row, None, MatchMethod::None, best_score)
    }

    fn from_row(
        row: &ExtractedRow,
        matched_entity_id: Option<String>,
        match_method: MatchMethod,
        confidence: f64,
    ) -> Self {
        Self {
            row_index: row.row_index,
            raw_name: row.raw_name.clone(),
            raw_id: row.raw_id.clone(),
            matched_entity_id,
            match_method,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.match_method != MatchMethod::None
    }
}

/// Aggregate over one batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_rows: usize,
    pub matched_rows: usize,
    /// Exact ratio, not rounded
    pub match_percentage: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let total_rows = results.len();
        let matched_rows = results.iter().filter(|r| r.is_matched()).count();
        Self {
            total_rows,
            matched_rows,
            match_percentage: percentage(matched_rows, total_rows),
        }
    }

    /// Percentage rounded to one decimal place for display
    pub fn rounded_percentage(&self) -> f64 {
        (self.match_percentage * 10.0).round() / 10.0
    }
}

/// `part / whole * 100`, 0 when `whole` is 0
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Per-row results plus the batch summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub results: Vec<MatchResult>,
    pub summary: BatchSummary,
}

impl BatchOutcome {
    pub fn new(results: Vec<MatchResult>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self { results, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, method: MatchMethod) -> MatchResult {
        let row = ExtractedRow::new(index, format!("name {}", index), None);
        match method {
            MatchMethod::Id => MatchResult::by_id(&row, "1"),
            MatchMethod::Name => MatchResult::by_name(&row, "1", 0.7),
            MatchMethod::None => MatchResult::unmatched(&row, 0.2),
        }
    }

    #[test]
    fn test_normalized_id() {
        assert_eq!(ExtractedRow::new(1, "a", Some(" 42 ")).normalized_id(), Some("42"));
        assert_eq!(ExtractedRow::new(1, "a", Some("   ")).normalized_id(), None);
        assert_eq!(ExtractedRow::new(1, "a", None).normalized_id(), None);
    }

    #[test]
    fn test_constructors_keep_invariants() {
        let row = ExtractedRow::new(3, "Jane Roe", Some("9"));

        let by_id = MatchResult::by_id(&row, "9");
        assert_eq!(by_id.confidence, 1.0);
        assert_eq!(by_id.matched_entity_id.as_deref(), Some("9"));

        let none = MatchResult::unmatched(&row, 0.4);
        assert!(none.matched_entity_id.is_none());
        assert_eq!(none.confidence, 0.4);
        assert_eq!(none.raw_name, "Jane Roe");
        assert_eq!(none.row_index, 3);
    }

    #[test]
    fn test_summary_seven_of_eight() {
        let mut results: Vec<MatchResult> = (1..=7).map(|i| result(i, MatchMethod::Id)).collect();
        results.push(result(8, MatchMethod::None));

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total_rows, 8);
        assert_eq!(summary.matched_rows, 7);
        assert_eq!(summary.match_percentage, 87.5);
        assert_eq!(summary.rounded_percentage(), 87.5);
    }

    #[test]
    fn test_summary_empty() {
        let summary = BatchSummary::from_results(&[]);
        assert_eq!(summary.total_rows, 0);
        assert_eq!(summary.match_percentage, 0.0);
    }

    #[test]
    fn test_rounded_percentage() {
        let results = vec![
            result(1, MatchMethod::Name),
            result(2, MatchMethod::None),
            result(3, MatchMethod::None),
        ];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.rounded_percentage(), 33.3);
    }

    #[test]
    fn test_match_method_serde() {
        let json = serde_json::to_string(&MatchMethod::Name).unwrap();
        assert_eq!(json, "\"NAME\"");
        let method: MatchMethod = serde_json::from_str("\"ID\"").unwrap();
        assert_eq!(method, MatchMethod::Id);
    }

    #[test]
    fn test_row_deserialize_aliases() {
        let row: ExtractedRow =
            serde_json::from_str(r#"{"rowIndex": 2, "name": "Ann Lee", "employeeId": "77"}"#).unwrap();
        assert_eq!(row.row_index, 2);
        assert_eq!(row.raw_name, "Ann Lee");
        assert_eq!(row.raw_id.as_deref(), Some("77"));
    }
}
