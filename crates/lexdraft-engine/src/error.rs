use std::path::PathBuf;

use thiserror::Error;

use crate::render::errors::{ConversionError, RenderError};
use crate::store::{DocumentId, StoreError, TemplateId};

/// Umbrella error for pipeline operations. Extraction failures never show
/// up here (they collapse to empty variable lists); render and lineage
/// failures abort the single operation; batch row failures are recorded in
/// the run report instead of being raised.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template {0} not found")]
    TemplateNotFound(TemplateId),

    #[error("Template file not found on disk: {}", .0.display())]
    TemplateFileMissing(PathBuf),

    #[error("Document {0} not found")]
    DocumentNotFound(DocumentId),

    #[error("Parent document {0} not found")]
    ParentNotFound(DocumentId),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed batch input: unreadable workbook, no worksheet, no header
    /// row.
    #[error("Invalid batch input: {0}")]
    Validation(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
