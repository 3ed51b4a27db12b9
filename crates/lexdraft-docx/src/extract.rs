//! Placeholder variable extraction
//!
//! Templates mark variables as `{{ name }}`. Extraction returns the unique
//! names in first-seen order: body blocks in strict document order
//! (recursing into table cells), then headers, then footers. Within one
//! header or footer the scan is flat, paragraphs before tables; that
//! deviation from visual order is a known limitation of the traversal and
//! is pinned by tests.

use std::collections::HashSet;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::document::{Block, StructuredDocument};

lazy_static! {
    /// `{{ token }}` where the token is anything but a closing brace.
    /// Inner whitespace is trimmed; there is no escaping mechanism.
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([^}]+)\}\}").unwrap();
}

/// Unique variable names of the whole document, first occurrence wins.
pub fn extract_variables(doc: &StructuredDocument) -> Vec<String> {
    let mut ordered = scan_blocks(&doc.body);
    for header in &doc.headers {
        ordered.extend(scan_flat(&header.blocks));
    }
    for footer in &doc.footers {
        ordered.extend(scan_flat(&footer.blocks));
    }
    dedup_keep_first(ordered)
}

/// Best-effort extraction from a file. Any read or parse failure yields an
/// empty list; a template with an unreadable package simply has no
/// variables as far as callers are concerned.
pub fn extract_from_path(path: &Path) -> Vec<String> {
    match crate::package::read_path(path) {
        Ok(doc) => extract_variables(&doc),
        Err(e) => {
            warn!(
                "variable extraction failed for {}: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Matches within one paragraph's text, in order, duplicates included.
fn matches_in(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|token| token.as_str().trim())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Document-order scan: each subtree yields its own sequence and the caller
/// concatenates, so a paragraph, a table and a following paragraph come out
/// in exactly that order. Cells recurse through nested tables.
fn scan_blocks(blocks: &[Block]) -> Vec<String> {
    let mut found = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph(text) => found.extend(matches_in(text)),
            Block::Table(table) => {
                for row in &table.rows {
                    for cell in &row.cells {
                        found.extend(scan_blocks(&cell.blocks));
                    }
                }
            }
        }
    }
    found
}

/// Header/footer scan: all top-level paragraphs first, then every table
/// with each cell contributing only its direct paragraphs. Nested tables
/// inside header cells are not descended into.
fn scan_flat(blocks: &[Block]) -> Vec<String> {
    let mut found = Vec::new();
    for block in blocks {
        if let Block::Paragraph(text) = block {
            found.extend(matches_in(text));
        }
    }
    for block in blocks {
        if let Block::Table(table) = block {
            for row in &table.rows {
                for cell in &row.cells {
                    for cell_block in &cell.blocks {
                        if let Block::Paragraph(text) = cell_block {
                            found.extend(matches_in(text));
                        }
                    }
                }
            }
        }
    }
    found
}

fn dedup_keep_first(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
