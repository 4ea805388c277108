//! JSON directory exports
//!
//! Two shapes are accepted:
//! - a plain array of `{"id": ..., "name": ...}` records
//! - a DynamoDB scan export `{"Items": [...]}` of profile items keyed
//!   `PK = EMP#<id>`, `SK = PROFILE`, carrying a `Name` attribute

use super::unavailable;
use crate::config::DirectoryConfig;
use crate::error::Result;
use serde_json::Value;
use signin_recon_common::ReferenceEntity;
use std::path::Path;

pub fn load(path: &Path, config: &DirectoryConfig) -> Result<Vec<ReferenceEntity>> {
    let content = std::fs::read_to_string(path).map_err(|e| unavailable(path, &e.to_string()))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| unavailable(path, &format!("invalid JSON: {}", e)))?;
    parse(path, &value, config)
}

pub fn parse(path: &Path, value: &Value, config: &DirectoryConfig) -> Result<Vec<ReferenceEntity>> {
    if let Some(items) = value.get("Items").and_then(Value::as_array) {
        return Ok(profile_items(items, config));
    }

    let records = value
        .as_array()
        .ok_or_else(|| unavailable(path, "expected an array of records or an Items export"))?;

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let id = attribute(record, &["id", "Id", "EmployeeID", "employeeId"])
                .ok_or_else(|| unavailable(path, &format!("record {} has no id", i + 1)))?;
            let name = attribute(record, &["name", "Name"]).unwrap_or_default();
            Ok(ReferenceEntity::new(id, name))
        })
        .collect()
}

fn profile_items(items: &[Value], config: &DirectoryConfig) -> Vec<ReferenceEntity> {
    items
        .iter()
        .filter(|item| {
            attribute(item, &["SK"]).as_deref() == Some(config.profile_sort_key.as_str())
        })
        .filter_map(|item| {
            let pk = attribute(item, &["PK"])?;
            let id = pk.strip_prefix(config.partition_prefix.as_str())?.to_string();
            let name = attribute(item, &["Name"]).unwrap_or_default();
            Some(ReferenceEntity::new(id, name))
        })
        .collect()
}

/// First present attribute as text; plain and DynamoDB-typed (`{"S": ..}`) values
fn attribute(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("S").or_else(|| map.get("N")).and_then(scalar_text),
        _ => None,
    }
}
