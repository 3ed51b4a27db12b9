//! Structured document tree
//!
//! A parsed document package is a body plus any header and footer sections.
//! Blocks keep strict document order; table cells contain blocks again, so
//! tables nest to arbitrary depth. The tree is plain owned data, loaded
//! fresh from the package on every operation and never cached.

/// Header/footer slot within a section, mirroring the three reference
/// types a section can carry (`w:type` = `default` | `first` | `even`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFooterVariant {
    Default,
    FirstPage,
    EvenPage,
}

impl HeaderFooterVariant {
    /// Fixed visiting order for the variants of one section.
    pub const ORDER: [HeaderFooterVariant; 3] = [
        HeaderFooterVariant::Default,
        HeaderFooterVariant::FirstPage,
        HeaderFooterVariant::EvenPage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFooterVariant::Default => "default",
            HeaderFooterVariant::FirstPage => "first-page",
            HeaderFooterVariant::EvenPage => "even-page",
        }
    }
}

impl std::fmt::Display for HeaderFooterVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One body-level (or cell-level) content block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Concatenated run text of one paragraph; tabs map to `\t`,
    /// line/page breaks to `\n`.
    Paragraph(String),
    Table(Table),
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Block {
        Block::Paragraph(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// A table cell: an ordered list of blocks, possibly including nested tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub blocks: Vec<Block>,
}

impl Cell {
    pub fn new(blocks: Vec<Block>) -> Cell {
        Cell { blocks }
    }
}

/// A header or footer section with the variant it was referenced as.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFooter {
    pub variant: HeaderFooterVariant,
    pub blocks: Vec<Block>,
}

/// The parsed package: one body, then any headers and footers in section
/// order (sections in document order, variants in [`HeaderFooterVariant::ORDER`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredDocument {
    pub body: Vec<Block>,
    pub headers: Vec<HeaderFooter>,
    pub footers: Vec<HeaderFooter>,
}

impl StructuredDocument {
    /// Paragraph and table counts for one block list, nested blocks included.
    pub fn count_blocks(blocks: &[Block]) -> (usize, usize) {
        let mut paragraphs = 0;
        let mut tables = 0;
        for block in blocks {
            match block {
                Block::Paragraph(_) => paragraphs += 1,
                Block::Table(table) => {
                    tables += 1;
                    for row in &table.rows {
                        for cell in &row.cells {
                            let (p, t) = Self::count_blocks(&cell.blocks);
                            paragraphs += p;
                            tables += t;
                        }
                    }
                }
            }
        }
        (paragraphs, tables)
    }
}
