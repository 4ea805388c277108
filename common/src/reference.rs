//! Reference snapshot
//!
//! Read-only view of the directory for one matching run. Keeps the loader's
//! order (used for name-tier tie-breaks) and indexes ids for the identifier tier.

use crate::error::{Error, Result};
use crate::normalize::normalize_name;
use crate::types::ReferenceEntity;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entities: Vec<ReferenceEntity>,
    /// Names folded once up front, parallel to `entities`
    normalized_names: Vec<String>,
    by_id: HashMap<String, usize>,
}

impl ReferenceSet {
    /// Build a snapshot, refusing duplicate ids
    pub fn new(entities: Vec<ReferenceEntity>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            if by_id.insert(entity.id.clone(), index).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate reference id \"{}\"",
                    entity.id
                )));
            }
        }

        let normalized_names = entities.iter().map(|e| normalize_name(&e.name)).collect();

        Ok(Self {
            entities,
            normalized_names,
            by_id,
        })
    }

    pub fn from_slice(entities: &[ReferenceEntity]) -> Result<Self> {
        Self::new(entities.to_vec())
    }

    /// Exact, case-sensitive id lookup
    pub fn get(&self, id: &str) -> Option<&ReferenceEntity> {
        self.by_id.get(id).map(|&index| &self.entities[index])
    }

    /// Entities with their folded names, in snapshot order
    pub fn iter_normalized(&self) -> impl Iterator<Item = (&ReferenceEntity, &str)> {
        self.entities
            .iter()
            .zip(self.normalized_names.iter().map(String::as_str))
    }

    pub fn entities(&self) -> &[ReferenceEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
