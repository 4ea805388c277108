use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error(transparent)]
    Common(#[from] signin_recon_common::Error),

    #[error("Reference directory unavailable: {0}")]
    ReferenceUnavailable(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("No sheet files found in: {0}")]
    NoSheetsFound(String),

    #[error("Invalid sheet date \"{0}\" (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Excel generation error: {0}")]
    ExcelGeneration(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconError {
    /// Malformed call: absent rows, duplicate reference ids, bad threshold
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ReconError::Common(signin_recon_common::Error::InvalidInput(_)))
    }

    pub fn is_reference_unavailable(&self) -> bool {
        matches!(self, ReconError::ReferenceUnavailable(_))
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReconError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReconError::ExcelGeneration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
