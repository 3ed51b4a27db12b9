//! Shared fixtures for engine integration tests
//!
//! The renderer and converter mocks make the pipeline observable: the
//! renderer writes the final context as JSON so tests can assert on
//! exactly what the template would have seen.

// Shared across several test binaries; not every binary uses every helper.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;

use lexdraft_engine::{
    ConversionError, DocumentGenerator, FileStorage, FormatConverter, MemoryDocumentStore,
    MemoryTemplateStore, NewTemplate, RenderContext, RenderError, Template, TemplateRenderer,
    TemplateStore,
};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const OWNER: u64 = 7;

/// Serializes the render context to JSON instead of filling a template.
pub struct JsonRenderer;

impl TemplateRenderer for JsonRenderer {
    fn render(&self, template: &Path, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        std::fs::metadata(template)?;
        serde_json::to_vec(context.vars()).map_err(|e| RenderError::Engine(e.to_string()))
    }
}

/// Fails with a syntax error whenever the context carries the trigger
/// variable, otherwise behaves like [`JsonRenderer`].
pub struct FailOn {
    pub trigger: String,
}

impl TemplateRenderer for FailOn {
    fn render(&self, template: &Path, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        if context.contains(&self.trigger) {
            return Err(RenderError::Syntax(format!("unknown tag {}", self.trigger)));
        }
        JsonRenderer.render(template, context)
    }
}

/// Prepends a PDF-looking magic prefix to whatever it is given.
pub struct StampConverter;

impl FormatConverter for StampConverter {
    fn convert(&self, rendered: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let mut converted = b"%PDF-".to_vec();
        converted.extend_from_slice(rendered);
        Ok(converted)
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub templates: Arc<MemoryTemplateStore>,
    pub documents: Arc<MemoryDocumentStore>,
    pub generator: DocumentGenerator,
}

/// Standard fixture: JSON renderer plus stamping converter.
pub fn fixture() -> Fixture {
    fixture_with(Arc::new(JsonRenderer), Some(Arc::new(StampConverter)))
}

pub fn fixture_with(
    renderer: Arc<dyn TemplateRenderer>,
    converter: Option<Arc<dyn FormatConverter>>,
) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let templates = Arc::new(MemoryTemplateStore::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let storage = FileStorage::new(dir.path().join("generated")).unwrap();
    let generator = DocumentGenerator::new(
        templates.clone(),
        documents.clone(),
        storage,
        renderer,
        converter,
    );
    Fixture {
        dir,
        templates,
        documents,
        generator,
    }
}

/// Registers a template backed by a stub file. Enough for renderer mocks,
/// which never parse the template contents.
pub fn register_template(fx: &Fixture, title: &str) -> Template {
    let file_path = fx.dir.path().join(format!("{title}.docx"));
    std::fs::write(&file_path, b"template bytes").unwrap();
    fx.templates
        .create(NewTemplate {
            title: title.into(),
            description: None,
            file_path,
            owner_id: OWNER,
        })
        .unwrap()
}

/// Registers a template backed by a real minimal package, for operations
/// that extract placeholders from the stored file.
pub fn register_docx_template(fx: &Fixture, title: &str, paragraphs: &[&str]) -> Template {
    let file_path = fx.dir.path().join(format!("{title}.docx"));
    std::fs::write(&file_path, docx_with_paragraphs(paragraphs)).unwrap();
    fx.templates
        .create(NewTemplate {
            title: title.into(),
            description: None,
            file_path,
            owner_id: OWNER,
        })
        .unwrap()
}

/// Builds a minimal package whose body holds the given paragraphs.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for text in paragraphs {
        body.push_str(&format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>"
        ));
    }
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
