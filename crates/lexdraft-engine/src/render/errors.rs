use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// Malformed template syntax: unbalanced delimiters, invalid control
    /// expressions.
    #[error("Template syntax error: {0}")]
    Syntax(String),

    #[error("Failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendering engine failure: {0}")]
    Engine(String),
}

#[derive(Error, Debug)]
pub enum ConversionError {
    /// No converter is wired in, or the conversion backend is not reachable.
    #[error("Conversion unavailable: {0}")]
    Unavailable(String),

    #[error("Conversion failed: {0}")]
    Failed(String),
}
