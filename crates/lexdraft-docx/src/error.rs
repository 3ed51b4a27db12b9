use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    /// The bytes are not a document package we can read: not a ZIP archive,
    /// no `word/document.xml`, or a part that fails to parse as XML.
    #[error("Unreadable document package: {0}")]
    Unreadable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
