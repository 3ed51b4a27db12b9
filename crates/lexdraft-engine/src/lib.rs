//! Document generation engine
//!
//! Turns registered Word templates into tracked documents: extracts the
//! `{{variable}}` placeholders, renders through a pluggable engine with
//! `title` and `date` defaults injected, files the output under a stable
//! name and records version lineage. Batch runs drive the same pipeline
//! from spreadsheet rows. Rendering and PDF conversion are capability
//! traits so the engine itself stays free of external processes.

pub mod batch;
pub mod error;
pub mod generate;
pub mod naming;
pub mod render;
pub mod schema;
pub mod storage;
pub mod store;
pub mod templates;

pub use batch::{BatchResult, BatchRowError, BatchRunner, BatchTemplate, GeneratedRef};
pub use error::EngineError;
pub use generate::{DocumentGenerator, GenerateRequest, PreviewRequest};
pub use render::context::{ContextDefaults, RenderContext};
pub use render::errors::{ConversionError, RenderError};
pub use render::{DownloadFormat, FormatConverter, TemplateRenderer};
pub use schema::{scaffold_schema, FieldDescriptor, FieldKind, SelectOption, ShowIf};
pub use storage::FileStorage;
pub use store::{
    DocumentFilter, DocumentId, DocumentStore, GeneratedDocument, MemoryDocumentStore,
    MemoryTemplateStore, NewDocument, NewTemplate, OwnerId, StoreError, Template, TemplateId,
    TemplateStore,
};
pub use templates::TemplateManager;
