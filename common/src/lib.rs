//! Sign-in reconciliation common library
//!
//! Pure matching core shared by the CLI: data model, name folding,
//! similarity, the two-tier matching engine, statistics and Textract parsing.
//! Nothing here performs I/O.

pub mod types;
pub mod error;
pub mod normalize;
pub mod similarity;
pub mod reference;
pub mod engine;
pub mod stats;
pub mod parser;

pub use types::{BatchOutcome, BatchSummary, ExtractedRow, MatchMethod, MatchResult, ReferenceEntity};
pub use error::{Error, Result};
pub use normalize::normalize_name;
pub use similarity::similarity;
pub use reference::ReferenceSet;
pub use engine::{Matcher, MatcherOptions, DEFAULT_NAME_MATCH_THRESHOLD};
pub use stats::{ConfidenceBands, ReconStats, RowStatus};
pub use parser::{parse_textract_json, parse_textract_value, TableOptions};
