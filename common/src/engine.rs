//! Matching engine
//!
//! ## Per-row procedure
//! 1. Identifier tier: trimmed `raw_id` looked up exactly in the snapshot.
//!    A hit is final (confidence 1.0), whatever the name says.
//! 2. Name tier: folded `raw_name` scored against every folded entity name.
//!    Highest score wins, earliest entity on ties, accepted at or above the
//!    threshold. Below it the near-miss score is still reported.
//!
//! Rows are independent, so a batch may be matched in parallel; output order
//! always equals input order.

use crate::error::{Error, Result};
use crate::normalize::normalize_name;
use crate::reference::ReferenceSet;
use crate::similarity::similarity;
use crate::types::{BatchOutcome, ExtractedRow, MatchResult, ReferenceEntity};
use tracing::debug;

/// Default minimum similarity for a name-tier match
pub const DEFAULT_NAME_MATCH_THRESHOLD: f64 = 0.6;

/// Engine options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherOptions {
    /// Minimum similarity (inclusive) to accept a name match
    pub name_match_threshold: f64,
    /// Match rows on the rayon pool when the `parallel` feature is on
    pub parallel: bool,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            name_match_threshold: DEFAULT_NAME_MATCH_THRESHOLD,
            parallel: true,
        }
    }
}

/// Reject thresholds outside `[0, 1]`
pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(Error::InvalidInput(format!(
            "name match threshold must be within [0, 1], got {}",
            threshold
        )))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Matcher {
    options: MatcherOptions,
}

impl Matcher {
    pub fn new(options: MatcherOptions) -> Result<Self> {
        validate_threshold(options.name_match_threshold)?;
        Ok(Self { options })
    }

    pub fn with_threshold(threshold: f64) -> Result<Self> {
        Self::new(MatcherOptions {
            name_match_threshold: threshold,
            ..Default::default()
        })
    }

    /// Same matcher, rows matched one after another
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Match a batch against a raw entity list
    ///
    /// Fails with `InvalidInput` on duplicate reference ids before any row is
    /// looked at; otherwise every row yields exactly one result.
    pub fn match_batch(
        &self,
        rows: &[ExtractedRow],
        reference: &[ReferenceEntity],
    ) -> Result<BatchOutcome> {
        let snapshot = ReferenceSet::from_slice(reference)?;
        Ok(self.match_snapshot(rows, &snapshot))
    }

    /// Match a batch against an already validated snapshot
    pub fn match_snapshot(&self, rows: &[ExtractedRow], reference: &ReferenceSet) -> BatchOutcome {
        let results = self.match_rows(rows, reference);
        let outcome = BatchOutcome::new(results);
        debug!(
            total = outcome.summary.total_rows,
            matched = outcome.summary.matched_rows,
            "batch matched"
        );
        outcome
    }

    #[cfg(feature = "parallel")]
    fn match_rows(&self, rows: &[ExtractedRow], reference: &ReferenceSet) -> Vec<MatchResult> {
        use rayon::prelude::*;

        if self.options.parallel {
            // indexed collect keeps input order
            rows.par_iter()
                .map(|row| self.match_row(row, reference))
                .collect()
        } else {
            rows.iter().map(|row| self.match_row(row, reference)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn match_rows(&self, rows: &[ExtractedRow], reference: &ReferenceSet) -> Vec<MatchResult> {
        rows.iter().map(|row| self.match_row(row, reference)).collect()
    }

    /// Decide one row
    pub fn match_row(&self, row: &ExtractedRow, reference: &ReferenceSet) -> MatchResult {
        if let Some(id) = row.normalized_id() {
            if let Some(entity) = reference.get(id) {
                debug!(row = row.row_index, id = %entity.id, "identifier match");
                return MatchResult::by_id(row, &entity.id);
            }
            debug!(row = row.row_index, id, "identifier not in directory");
        }

        self.match_by_name(row, reference)
    }

    fn match_by_name(&self, row: &ExtractedRow, reference: &ReferenceSet) -> MatchResult {
        let name = normalize_name(&row.raw_name);
        if name.is_empty() {
            return MatchResult::unmatched(row, 0.0);
        }

        let best = best_name_match(&name, reference);
        match best {
            Some((entity, score)) if score >= self.options.name_match_threshold => {
                debug!(row = row.row_index, id = %entity.id, score, "name match");
                MatchResult::by_name(row, &entity.id, score)
            }
            Some((_, score)) => {
                debug!(row = row.row_index, score, "best name score below threshold");
                MatchResult::unmatched(row, score)
            }
            None => MatchResult::unmatched(row, 0.0),
        }
    }
}

/// Highest-scoring entity for a folded name; the first one wins a tie
pub fn best_name_match<'a>(
    name: &str,
    reference: &'a ReferenceSet,
) -> Option<(&'a ReferenceEntity, f64)> {
    let mut best: Option<(&ReferenceEntity, f64)> = None;
    for (entity, entity_name) in reference.iter_normalized() {
        let score = similarity(name, entity_name);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((entity, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchMethod;

    fn entity(id: &str, name: &str) -> ReferenceEntity {
        ReferenceEntity::new(id, name)
    }

    fn snapshot(entities: Vec<ReferenceEntity>) -> ReferenceSet {
        ReferenceSet::new(entities).unwrap()
    }

    #[test]
    fn test_id_match_wins_over_name() {
        let reference = snapshot(vec![entity("1042823", "Jeremy Dickamore")]);
        let row = ExtractedRow::new(1, "Jermey Dickamorc", Some("1042823"));

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.match_method, MatchMethod::Id);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.matched_entity_id.as_deref(), Some("1042823"));
    }

    #[test]
    fn test_id_match_ignores_dissimilar_name() {
        let reference = snapshot(vec![
            entity("7", "Completely Different"),
            entity("8", "Zora Quill"),
        ]);
        let row = ExtractedRow::new(1, "Zora Quill", Some(" 7 "));

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.match_method, MatchMethod::Id);
        assert_eq!(result.matched_entity_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_unknown_id_falls_through_to_name() {
        let reference = snapshot(vec![entity("5001", "Jeremy Dickamore")]);
        let row = ExtractedRow::new(1, "Jermey Dickamorc", Some("9999"));

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.match_method, MatchMethod::Name);
        assert_eq!(result.matched_entity_id.as_deref(), Some("5001"));
        assert!((result.confidence - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_id_comparison_is_case_sensitive() {
        let reference = snapshot(vec![entity("ab12", "Ann Lee")]);
        let row = ExtractedRow::new(1, "", Some("AB12"));

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.match_method, MatchMethod::None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_name_tie_goes_to_first_entity() {
        let reference = snapshot(vec![
            entity("first", "Ann Lee"),
            entity("second", "ann   lee"),
        ]);
        let row = ExtractedRow::new(1, "ANN LEE", None);

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.matched_entity_id.as_deref(), Some("first"));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // "ab" vs "ba" scores exactly 0.5
        let reference = snapshot(vec![entity("1", "ba")]);
        let row = ExtractedRow::new(1, "ab", None);

        let at = Matcher::with_threshold(0.5).unwrap().match_row(&row, &reference);
        assert_eq!(at.match_method, MatchMethod::Name);
        assert_eq!(at.confidence, 0.5);

        let above = Matcher::with_threshold(0.5 + f64::EPSILON)
            .unwrap()
            .match_row(&row, &reference);
        assert_eq!(above.match_method, MatchMethod::None);
        assert!(above.matched_entity_id.is_none());
        assert_eq!(above.confidence, 0.5);
    }

    #[test]
    fn test_near_miss_score_reported() {
        let reference = snapshot(vec![entity("1", "Alice Smith")]);
        let row = ExtractedRow::new(1, "Bob Jones", None);

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.match_method, MatchMethod::None);
        assert!((result.confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_blank_name_without_id() {
        let reference = snapshot(vec![entity("1", "Alice Smith")]);
        let row = ExtractedRow::new(1, "   ", None);

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.match_method, MatchMethod::None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_empty_reference() {
        let reference = ReferenceSet::default();
        let row = ExtractedRow::new(1, "Alice Smith", Some("1"));

        let result = Matcher::default().match_row(&row, &reference);
        assert_eq!(result.match_method, MatchMethod::None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(Matcher::with_threshold(-0.1).is_err());
        assert!(Matcher::with_threshold(1.01).is_err());
        assert!(Matcher::with_threshold(f64::NAN).is_err());
        assert!(Matcher::with_threshold(0.0).is_ok());
        assert!(Matcher::with_threshold(1.0).is_ok());
    }

    #[test]
    fn test_duplicate_reference_ids() {
        let reference = vec![entity("1", "Ann"), entity("1", "Bob")];
        let rows = vec![ExtractedRow::new(1, "Ann", None)];

        let err = Matcher::default().match_batch(&rows, &reference).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
