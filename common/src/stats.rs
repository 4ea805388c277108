//! Reconciliation statistics
//!
//! Everything a reviewer of a sign-in sheet wants beyond the match percentage:
//! confidence bands, per-tier counts, names nobody could place, and directory
//! entries that never showed up on the sheet.

use crate::reference::ReferenceSet;
use crate::types::{percentage, BatchOutcome, MatchMethod, MatchResult, ReferenceEntity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Confidence bands used for row status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBands {
    /// At or above: a valid sign-in
    pub valid: f64,
    /// At or above: counted as high confidence
    pub high: f64,
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            valid: 0.90,
            high: 0.80,
        }
    }
}

/// Display status of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Matched,
    LowConf,
    NoMatch,
}

impl RowStatus {
    pub fn of(result: &MatchResult, bands: &ConfidenceBands) -> Self {
        if !result.is_matched() {
            RowStatus::NoMatch
        } else if result.confidence >= bands.valid {
            RowStatus::Matched
        } else {
            RowStatus::LowConf
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Matched => write!(f, "MATCHED"),
            RowStatus::LowConf => write!(f, "LOW CONF"),
            RowStatus::NoMatch => write!(f, "NO MATCH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconStats {
    pub valid_matches: usize,
    pub high_confidence: usize,
    pub id_matches: usize,
    pub name_matches: usize,
    pub no_matches: usize,
    /// Distinct directory entries matched at least once
    pub unique_entities_matched: usize,
    /// Non-blank sheet names that matched nothing
    pub extra_names: Vec<String>,
    /// Directory entries nobody matched, ordered by id
    pub absent_entities: Vec<ReferenceEntity>,
    /// `unique_entities_matched / directory size * 100`
    pub directory_coverage: f64,
}

impl ReconStats {
    pub fn compute(outcome: &BatchOutcome, reference: &ReferenceSet, bands: &ConfidenceBands) -> Self {
        let mut stats = ReconStats::default();
        let mut matched_ids: BTreeSet<&str> = BTreeSet::new();

        for result in &outcome.results {
            match result.match_method {
                MatchMethod::Id => stats.id_matches += 1,
                MatchMethod::Name => stats.name_matches += 1,
                MatchMethod::None => stats.no_matches += 1,
            }
            if RowStatus::of(result, bands) == RowStatus::Matched {
                stats.valid_matches += 1;
            }
            if result.confidence >= bands.high {
                stats.high_confidence += 1;
            }
            match &result.matched_entity_id {
                Some(id) => {
                    matched_ids.insert(id.as_str());
                }
                None => {
                    let name = result.raw_name.trim();
                    if !name.is_empty() {
                        stats.extra_names.push(name.to_string());
                    }
                }
            }
        }

        let mut absent: Vec<ReferenceEntity> = reference
            .entities()
            .iter()
            .filter(|e| !matched_ids.contains(e.id.as_str()))
            .cloned()
            .collect();
        absent.sort_by(|a, b| a.id.cmp(&b.id));

        stats.unique_entities_matched = matched_ids.len();
        stats.absent_entities = absent;
        stats.directory_coverage = percentage(matched_ids.len(), reference.len());
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Matcher;
    use crate::types::ExtractedRow;

    fn reference() -> ReferenceSet {
        ReferenceSet::new(vec![
            ReferenceEntity::new("300", "Carla Diaz"),
            ReferenceEntity::new("100", "Ann Lee"),
            ReferenceEntity::new("200", "Bob Ray"),
        ])
        .unwrap()
    }

    #[test]
    fn test_compute() {
        let reference = reference();
        let rows = vec![
            ExtractedRow::new(1, "Ann Lee", Some("100")),
            ExtractedRow::new(2, "Ann Lee", None),
            ExtractedRow::new(3, "Zzyzx Qwerty", None),
            ExtractedRow::new(4, "", None),
        ];
        let outcome = Matcher::default().sequential().match_snapshot(&rows, &reference);
        let stats = ReconStats::compute(&outcome, &reference, &ConfidenceBands::default());

        assert_eq!(stats.id_matches, 1);
        assert_eq!(stats.name_matches, 1);
        assert_eq!(stats.no_matches, 2);
        assert_eq!(stats.valid_matches, 2);
        assert_eq!(stats.high_confidence, 2);
        assert_eq!(stats.unique_entities_matched, 1);
        assert_eq!(stats.extra_names, vec!["Zzyzx Qwerty".to_string()]);
        let absent: Vec<&str> = stats.absent_entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(absent, vec!["200", "300"]);
        assert!((stats.directory_coverage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_row_status() {
        let bands = ConfidenceBands::default();
        let row = ExtractedRow::new(1, "x", None);

        assert_eq!(RowStatus::of(&MatchResult::by_id(&row, "1"), &bands), RowStatus::Matched);
        assert_eq!(RowStatus::of(&MatchResult::by_name(&row, "1", 0.7), &bands), RowStatus::LowConf);
        assert_eq!(RowStatus::of(&MatchResult::unmatched(&row, 0.3), &bands), RowStatus::NoMatch);
        assert_eq!(RowStatus::of(&MatchResult::unmatched(&row, 0.95), &bands), RowStatus::NoMatch);
        assert_eq!(RowStatus::of(&MatchResult::unmatched(&row, 0.0), &bands), RowStatus::NoMatch);
        assert_eq!(RowStatus::NoMatch.to_string(), "NO MATCH");
    }

    #[test]
    fn test_empty_directory_coverage() {
        let outcome = BatchOutcome::default();
        let stats = ReconStats::compute(&outcome, &ReferenceSet::default(), &ConfidenceBands::default());
        assert_eq!(stats.directory_coverage, 0.0);
        assert!(stats.absent_entities.is_empty());
    }
}
