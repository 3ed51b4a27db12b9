//! Document package reading
//!
//! A `.docx` file is a ZIP archive of XML parts. The reader walks
//! `word/document.xml` for body blocks, collects the header/footer
//! references of every `w:sectPr`, resolves them through
//! `word/_rels/document.xml.rels` and parses each referenced part into its
//! own section. Only block structure and run text survive; formatting is
//! left to the rendering engine.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::document::{
    Block, Cell, HeaderFooter, HeaderFooterVariant, Row, StructuredDocument, Table,
};
use crate::error::DocxError;

const DOCUMENT_PART: &str = "word/document.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";

/// Reads a document package from disk.
pub fn read_path(path: &Path) -> Result<StructuredDocument, DocxError> {
    let bytes = std::fs::read(path)?;
    read_bytes(&bytes)
}

/// Reads a document package from memory.
pub fn read_bytes(bytes: &[u8]) -> Result<StructuredDocument, DocxError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocxError::Unreadable(format!("not a ZIP package: {e}")))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| DocxError::Unreadable(format!("missing {DOCUMENT_PART}")))?;
    let rels = match read_part(&mut archive, RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let mut sections = Vec::new();
    let body = PartParser::new(&document_xml, DOCUMENT_PART).blocks(&mut sections)?;

    let mut headers = Vec::new();
    let mut footers = Vec::new();
    for section in &sections {
        for variant in HeaderFooterVariant::ORDER {
            if let Some(rel_id) = find_ref(&section.headers, variant) {
                if let Some(blocks) = load_referenced_part(&mut archive, &rels, rel_id)? {
                    headers.push(HeaderFooter { variant, blocks });
                }
            }
            if let Some(rel_id) = find_ref(&section.footers, variant) {
                if let Some(blocks) = load_referenced_part(&mut archive, &rels, rel_id)? {
                    footers.push(HeaderFooter { variant, blocks });
                }
            }
        }
    }

    debug!(
        "parsed package: {} body blocks, {} headers, {} footers",
        body.len(),
        headers.len(),
        footers.len()
    );
    Ok(StructuredDocument {
        body,
        headers,
        footers,
    })
}

/// Header/footer references collected from one `w:sectPr`, in XML order.
#[derive(Default)]
struct SectionRefs {
    headers: Vec<(HeaderFooterVariant, String)>,
    footers: Vec<(HeaderFooterVariant, String)>,
}

fn find_ref(refs: &[(HeaderFooterVariant, String)], variant: HeaderFooterVariant) -> Option<&str> {
    refs.iter()
        .find(|(v, _)| *v == variant)
        .map(|(_, id)| id.as_str())
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, DocxError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(DocxError::Unreadable(format!("cannot open {name}: {e}"))),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| DocxError::Unreadable(format!("cannot read {name}: {e}")))?;
    Ok(Some(xml))
}

fn load_referenced_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    rels: &HashMap<String, String>,
    rel_id: &str,
) -> Result<Option<Vec<Block>>, DocxError> {
    let Some(target) = rels.get(rel_id) else {
        warn!("relationship {rel_id} is not in the rels part, skipping");
        return Ok(None);
    };
    let name = part_name(target);
    let Some(xml) = read_part(archive, &name)? else {
        warn!("referenced part {name} is missing from the archive, skipping");
        return Ok(None);
    };
    let blocks = PartParser::new(&xml, &name).blocks(&mut Vec::new())?;
    Ok(Some(blocks))
}

/// Relationship targets are relative to `word/`; absolute targets carry a
/// leading slash.
fn part_name(target: &str) -> String {
    let target = target.trim_start_matches('/');
    if target.starts_with("word/") {
        target.to_string()
    } else {
        format!("word/{target}")
    }
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut map = HashMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    map.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocxError::Unreadable(format!(
                    "invalid XML in {RELS_PART}: {e}"
                )))
            }
            _ => {}
        }
    }
    Ok(map)
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
}

fn variant_from_type(value: Option<&str>) -> HeaderFooterVariant {
    match value {
        Some("first") => HeaderFooterVariant::FirstPage,
        Some("even") => HeaderFooterVariant::EvenPage,
        _ => HeaderFooterVariant::Default,
    }
}

/// Event-stream parser for one XML part. Each method consumes the events of
/// its element through the matching end tag, so nested structures (tables in
/// cells, sections in paragraph properties) stay correctly scoped.
struct PartParser<'x> {
    reader: Reader<&'x [u8]>,
    part: &'x str,
}

impl<'x> PartParser<'x> {
    fn new(xml: &'x str, part: &'x str) -> Self {
        PartParser {
            reader: Reader::from_str(xml),
            part,
        }
    }

    fn next_event(&mut self) -> Result<Event<'x>, DocxError> {
        let position = self.reader.buffer_position();
        self.reader.read_event().map_err(|e| {
            DocxError::Unreadable(format!(
                "invalid XML in {} at byte {}: {}",
                self.part, position, e
            ))
        })
    }

    fn skip_element(&mut self, start: &BytesStart) -> Result<(), DocxError> {
        self.reader.read_to_end(start.name()).map(|_| ()).map_err(|e| {
            DocxError::Unreadable(format!("invalid XML in {}: {}", self.part, e))
        })
    }

    /// Top-level blocks of the part, reading to end of input. Section
    /// properties encountered along the way (body-level or inside a
    /// paragraph's `w:pPr`) are appended to `sections` in document order.
    fn blocks(mut self, sections: &mut Vec<SectionRefs>) -> Result<Vec<Block>, DocxError> {
        let mut blocks = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:p" => blocks.push(Block::Paragraph(self.paragraph(sections)?)),
                    b"w:tbl" => blocks.push(Block::Table(self.table(sections)?)),
                    b"w:sectPr" => {
                        let refs = self.sect_pr()?;
                        sections.push(refs);
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"w:p" => blocks.push(Block::Paragraph(String::new())),
                    b"w:tbl" => blocks.push(Block::Table(Table::default())),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(blocks)
    }

    /// Consumes one `w:p` element, returning its concatenated run text.
    /// Only `w:t` content counts as text; run-level tabs and breaks map to
    /// `\t` and `\n`. Drawings and legacy pictures are skipped whole so
    /// text-box content does not leak into the paragraph.
    fn paragraph(&mut self, sections: &mut Vec<SectionRefs>) -> Result<String, DocxError> {
        let mut text = String::new();
        let mut in_run = false;
        let mut in_text = false;
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:r" => in_run = true,
                    b"w:t" => in_text = true,
                    b"w:sectPr" => {
                        let refs = self.sect_pr()?;
                        sections.push(refs);
                    }
                    b"w:drawing" | b"w:pict" | b"mc:AlternateContent" => self.skip_element(&e)?,
                    _ => {}
                },
                Event::Empty(e) if in_run => match e.name().as_ref() {
                    b"w:tab" => text.push('\t'),
                    b"w:br" | b"w:cr" => text.push('\n'),
                    _ => {}
                },
                Event::Text(t) if in_text => {
                    let chunk = t.unescape().map_err(|e| {
                        DocxError::Unreadable(format!("invalid text in {}: {}", self.part, e))
                    })?;
                    text.push_str(&chunk);
                }
                Event::End(e) => match e.name().as_ref() {
                    b"w:p" => break,
                    b"w:r" => in_run = false,
                    b"w:t" => in_text = false,
                    _ => {}
                },
                Event::Eof => {
                    return Err(DocxError::Unreadable(format!(
                        "unterminated paragraph in {}",
                        self.part
                    )))
                }
                _ => {}
            }
        }
        Ok(text)
    }

    fn table(&mut self, sections: &mut Vec<SectionRefs>) -> Result<Table, DocxError> {
        let mut rows = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"w:tr" => {
                    rows.push(self.row(sections)?);
                }
                Event::Empty(e) if e.name().as_ref() == b"w:tr" => rows.push(Row::default()),
                Event::End(e) if e.name().as_ref() == b"w:tbl" => break,
                Event::Eof => {
                    return Err(DocxError::Unreadable(format!(
                        "unterminated table in {}",
                        self.part
                    )))
                }
                _ => {}
            }
        }
        Ok(Table { rows })
    }

    fn row(&mut self, sections: &mut Vec<SectionRefs>) -> Result<Row, DocxError> {
        let mut cells = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"w:tc" => {
                    cells.push(self.cell(sections)?);
                }
                Event::Empty(e) if e.name().as_ref() == b"w:tc" => cells.push(Cell::default()),
                Event::End(e) if e.name().as_ref() == b"w:tr" => break,
                Event::Eof => {
                    return Err(DocxError::Unreadable(format!(
                        "unterminated table row in {}",
                        self.part
                    )))
                }
                _ => {}
            }
        }
        Ok(Row { cells })
    }

    /// Cells hold blocks again, so tables recurse here.
    fn cell(&mut self, sections: &mut Vec<SectionRefs>) -> Result<Cell, DocxError> {
        let mut blocks = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:p" => blocks.push(Block::Paragraph(self.paragraph(sections)?)),
                    b"w:tbl" => blocks.push(Block::Table(self.table(sections)?)),
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"w:p" => blocks.push(Block::Paragraph(String::new())),
                    b"w:tbl" => blocks.push(Block::Table(Table::default())),
                    _ => {}
                },
                Event::End(e) if e.name().as_ref() == b"w:tc" => break,
                Event::Eof => {
                    return Err(DocxError::Unreadable(format!(
                        "unterminated table cell in {}",
                        self.part
                    )))
                }
                _ => {}
            }
        }
        Ok(Cell { blocks })
    }

    /// Collects the `w:headerReference`/`w:footerReference` entries of one
    /// `w:sectPr`. XML order is irrelevant; lookups go by variant.
    fn sect_pr(&mut self) -> Result<SectionRefs, DocxError> {
        let mut refs = SectionRefs::default();
        loop {
            match self.next_event()? {
                Event::Start(e) | Event::Empty(e)
                    if matches!(
                        e.name().as_ref(),
                        b"w:headerReference" | b"w:footerReference"
                    ) =>
                {
                    let variant = variant_from_type(attr(&e, b"w:type").as_deref());
                    let Some(rel_id) = attr(&e, b"r:id") else {
                        warn!("header/footer reference without r:id in {}", self.part);
                        continue;
                    };
                    if e.name().as_ref() == b"w:headerReference" {
                        refs.headers.push((variant, rel_id));
                    } else {
                        refs.footers.push((variant, rel_id));
                    }
                }
                Event::End(e) if e.name().as_ref() == b"w:sectPr" => break,
                Event::Eof => {
                    return Err(DocxError::Unreadable(format!(
                        "unterminated section properties in {}",
                        self.part
                    )))
                }
                _ => {}
            }
        }
        Ok(refs)
    }
}
