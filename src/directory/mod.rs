//! Reference directory loading
//!
//! The directory is read once per run, before matching starts. Any failure to
//! produce it is `ReferenceUnavailable`; an unreadable source is never treated
//! as an empty directory.

mod csv;
mod excel;
mod json;

use crate::config::DirectoryConfig;
use crate::error::{ReconError, Result};
use sha2::{Digest, Sha256};
use signin_recon_common::parser::{header_key, ID_COLUMN, NAME_COLUMN};
use signin_recon_common::ReferenceEntity;
use std::path::{Path, PathBuf};
use tracing::info;

/// Source of trusted directory records
pub trait ReferenceDirectory {
    /// Human readable origin, for logs and reports
    fn describe(&self) -> String;

    /// Full current set of records, in source order
    fn load(&self) -> Result<Vec<ReferenceEntity>>;
}

/// Directory exported to a local file
#[derive(Debug, Clone)]
pub struct FileDirectory {
    path: PathBuf,
    config: DirectoryConfig,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>, config: DirectoryConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Directory named by the configuration
    pub fn from_config(config: &DirectoryConfig) -> Result<Self> {
        let path = config.source.clone().ok_or_else(|| {
            ReconError::ReferenceUnavailable(
                "no directory source configured (use --directory or `config --set-directory`)".into(),
            )
        })?;
        Ok(Self::new(path, config.clone()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceDirectory for FileDirectory {
    fn describe(&self) -> String {
        format!("{} ({})", self.path.display(), self.config.table_name)
    }

    fn load(&self) -> Result<Vec<ReferenceEntity>> {
        if !self.path.is_file() {
            return Err(unavailable(&self.path, "file not found"));
        }

        let extension = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let entities = match extension.as_str() {
            "json" => json::load(&self.path, &self.config)?,
            "csv" => csv::load(&self.path)?,
            "xlsx" | "xlsm" | "xls" | "ods" => excel::load(&self.path, self.config.sheet.as_deref())?,
            other => {
                return Err(unavailable(
                    &self.path,
                    &format!("unsupported directory format \"{}\"", other),
                ))
            }
        };

        info!(
            source = %self.path.display(),
            entities = entities.len(),
            "reference directory loaded"
        );
        Ok(entities)
    }
}

/// Directory already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    pub entities: Vec<ReferenceEntity>,
}

impl ReferenceDirectory for InMemoryDirectory {
    fn describe(&self) -> String {
        format!("in-memory ({} entities)", self.entities.len())
    }

    fn load(&self) -> Result<Vec<ReferenceEntity>> {
        Ok(self.entities.clone())
    }
}

/// SHA-256 over the snapshot, in order
pub fn snapshot_digest(entities: &[ReferenceEntity]) -> String {
    let mut hasher = Sha256::new();
    for entity in entities {
        hasher.update(entity.id.as_bytes());
        hasher.update(b"\t");
        hasher.update(entity.name.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

pub(crate) fn unavailable(path: &Path, reason: &str) -> ReconError {
    ReconError::ReferenceUnavailable(format!("{}: {}", path.display(), reason))
}

/// Column positions of id and name in a header row
pub(crate) fn locate_columns(header: &[String]) -> Option<(usize, usize)> {
    let keys: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, h)| header_key(h, i + 1))
        .collect();
    let id = keys.iter().position(|k| k == ID_COLUMN || k == "id")?;
    let name = keys.iter().position(|k| k == NAME_COLUMN)?;
    Some((id, name))
}

/// Entities from header + data rows; rows without an id are skipped
pub(crate) fn entities_from_table(
    path: &Path,
    mut rows: impl Iterator<Item = Vec<String>>,
) -> Result<Vec<ReferenceEntity>> {
    let header = rows
        .next()
        .ok_or_else(|| unavailable(path, "empty directory file (no header row)"))?;
    let (id_col, name_col) = locate_columns(&header)
        .ok_or_else(|| unavailable(path, "header must contain id and name columns"))?;

    let mut entities = Vec::new();
    for row in rows {
        let id = row.get(id_col).map(|v| v.trim()).unwrap_or("");
        if id.is_empty() {
            continue;
        }
        let name = row.get(name_col).map(|v| v.trim()).unwrap_or("");
        entities.push(ReferenceEntity::new(id, name));
    }
    Ok(entities)
}
