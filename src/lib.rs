//! Sign-in sheet reconciliation
//!
//! I/O side of the tool: configuration, directory loaders, sheet input,
//! reports and run orchestration. Matching itself lives in
//! `signin_recon_common`.

pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod report;

pub use error::{ReconError, Result};
