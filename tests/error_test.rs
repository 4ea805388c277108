//! Error cases
//!
//! Each failure surfaces as a distinguishable error before any row is matched.

use signin_recon::config::DirectoryConfig;
use signin_recon::directory::FileDirectory;
use signin_recon::error::ReconError;
use signin_recon::extractor;
use signin_recon::pipeline;
use signin_recon_common::TableOptions;
use std::path::Path;
use tempfile::tempdir;

fn load(path: &Path) -> signin_recon::Result<pipeline::Snapshot> {
    pipeline::load_snapshot(&FileDirectory::new(path, DirectoryConfig::default()))
}

/// Missing directory file
#[test]
fn test_directory_missing() {
    let err = load(Path::new("/nonexistent/staff/12345.csv")).unwrap_err();
    assert!(err.is_reference_unavailable());
    assert!(!err.is_invalid_input());
}

/// Unreadable or malformed directory contents
#[test]
fn test_directory_unusable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cases = [
        ("broken.json", "{not json"),
        ("object.json", r#"{"staff": []}"#),
        ("noheader.csv", ""),
        ("columns.csv", "first,last\nAnn,Lee\n"),
        ("staff.txt", "1,Ann"),
    ];

    for (name, content) in cases {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.is_reference_unavailable(), "{}: {:?}", name, err);
    }
}

/// Duplicate ids make the directory ambiguous
#[test]
fn test_directory_duplicate_ids() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("staff.csv");
    std::fs::write(&path, "id,name\n7,Ann Lee\n7,Bob Ray\n").unwrap();

    let err = load(&path).unwrap_err();
    assert!(err.is_invalid_input());
}

/// No configured directory source
#[test]
fn test_directory_not_configured() {
    let err = FileDirectory::from_config(&DirectoryConfig::default()).unwrap_err();
    assert!(err.is_reference_unavailable());
}

/// A sheet without a row collection is malformed; an empty one is not
#[test]
fn test_sheet_rows_absent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let absent = dir.path().join("absent.json");
    let empty = dir.path().join("empty.json");
    std::fs::write(&absent, r#"{"sheetId": "A1", "rows": null}"#).unwrap();
    std::fs::write(&empty, r#"{"sheetId": "A1", "rows": []}"#).unwrap();

    let err = extractor::load_rows(&absent, TableOptions::default()).unwrap_err();
    assert!(err.is_invalid_input());

    let sheet = extractor::load_rows(&empty, TableOptions::default()).unwrap();
    assert!(sheet.rows.is_empty());
}

#[test]
fn test_sheet_missing() {
    let err = extractor::load_rows(Path::new("/nonexistent/sheet.json"), TableOptions::default())
        .unwrap_err();
    assert!(matches!(err, ReconError::FileNotFound(_)));
}

#[test]
fn test_error_display() {
    let errors = vec![
        ReconError::ReferenceUnavailable("staff.csv: file not found".to_string()),
        ReconError::Config("bad threshold".to_string()),
        ReconError::FileNotFound("sheet.json".to_string()),
        ReconError::FolderNotFound("/path/to/folder".to_string()),
        ReconError::NoSheetsFound("folder".to_string()),
        ReconError::InvalidDate("01/02/2025".to_string()),
        ReconError::ExcelGeneration("write failed".to_string()),
        ReconError::Common(signin_recon_common::Error::InvalidInput("duplicate id".to_string())),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Error display should not be empty");
    }
}

/// Common errors keep their own message
#[test]
fn test_common_error_transparent() {
    let err: ReconError = signin_recon_common::Error::InvalidInput("duplicate id 7".to_string()).into();
    assert_eq!(
        err.to_string(),
        signin_recon_common::Error::InvalidInput("duplicate id 7".to_string()).to_string()
    );
    assert!(err.is_invalid_input());
}
