//! Rendering seam
//!
//! The actual template engine and the PDF converter are external services.
//! The pipeline depends only on these two capabilities, which keeps both
//! swappable and lets tests drive the whole flow with mocks.

pub mod context;
pub mod errors;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::context::RenderContext;
use crate::render::errors::{ConversionError, RenderError};

/// Fills a template with a context.
pub trait TemplateRenderer: Send + Sync {
    /// Renders the template file at `template` against `context` and
    /// returns the rendered package bytes.
    ///
    /// Contract: the template file is never modified; placeholder
    /// replacement preserves the surrounding formatting; placeholders with
    /// no context entry render as empty text.
    fn render(&self, template: &Path, context: &RenderContext) -> Result<Vec<u8>, RenderError>;
}

/// Converts rendered package bytes into the fixed-layout viewing format.
pub trait FormatConverter: Send + Sync {
    /// May be slow and may be unavailable altogether; callers treat
    /// conversion as optional wherever the format allows it.
    fn convert(&self, rendered: &[u8]) -> Result<Vec<u8>, ConversionError>;
}

/// Download format for generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    #[default]
    Docx,
    Pdf,
}

impl DownloadFormat {
    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            DownloadFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DownloadFormat::Pdf => "application/pdf",
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            DownloadFormat::Docx => "docx",
            DownloadFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadFormat::Docx => write!(f, "docx"),
            DownloadFormat::Pdf => write!(f, "pdf"),
        }
    }
}

impl std::str::FromStr for DownloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" => Ok(DownloadFormat::Docx),
            "pdf" => Ok(DownloadFormat::Pdf),
            other => Err(format!("Unknown download format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_round_trips_through_strings() {
        assert_eq!("pdf".parse::<DownloadFormat>(), Ok(DownloadFormat::Pdf));
        assert_eq!("DOCX".parse::<DownloadFormat>(), Ok(DownloadFormat::Docx));
        assert!("odt".parse::<DownloadFormat>().is_err());
        assert_eq!(DownloadFormat::Pdf.to_string(), "pdf");
    }

    #[test]
    fn mime_types_match_the_package_formats() {
        assert_eq!(DownloadFormat::Pdf.mime_type(), "application/pdf");
        assert!(DownloadFormat::Docx.mime_type().contains("wordprocessingml"));
    }
}
