//! Word-document structure reading and placeholder extraction
//!
//! This crate turns a `.docx` package into a [`StructuredDocument`] tree
//! (body, headers, footers, with tables nesting through cells) and extracts
//! `{{variable}}` placeholder names from it.
//!
//! - `package`: ZIP + WordprocessingML parsing into the block tree
//! - `extract`: ordered, de-duplicated variable name extraction
//!
//! Documents are read fresh on every call; nothing is cached.

pub mod document;
pub mod error;
pub mod extract;
pub mod package;

pub use document::{
    Block, Cell, HeaderFooter, HeaderFooterVariant, Row, StructuredDocument, Table,
};
pub use error::DocxError;
pub use extract::{extract_from_path, extract_variables};
pub use package::{read_bytes, read_path};
