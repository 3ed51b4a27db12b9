//! Document generation pipeline
//!
//! [`DocumentGenerator`] ties the stores, the flat file storage, and the
//! rendering capabilities together: it resolves the template, assigns the
//! revision number, renders with injected defaults, writes the output file
//! and records the metadata row. Download and delete operate on recorded
//! rows, including the PDF sidecar cache and the descendant cascade.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::naming;
use crate::render::context::{ContextDefaults, RenderContext};
use crate::render::errors::ConversionError;
use crate::render::{DownloadFormat, FormatConverter, TemplateRenderer};
use crate::storage::FileStorage;
use crate::store::{
    DocumentFilter, DocumentId, DocumentStore, GeneratedDocument, NewDocument, OwnerId, Template,
    TemplateId, TemplateStore,
};

/// Inputs for one persisted generation.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub title: String,
    pub template_id: TemplateId,
    pub owner_id: OwnerId,
    pub variables: HashMap<String, Value>,
    /// When set, the new document becomes a revision of this one.
    pub parent_id: Option<DocumentId>,
}

/// Inputs for a render that is converted and returned without being stored.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub title: String,
    pub template_id: TemplateId,
    pub variables: HashMap<String, Value>,
}

pub struct DocumentGenerator {
    pub(crate) templates: Arc<dyn TemplateStore>,
    pub(crate) documents: Arc<dyn DocumentStore>,
    pub(crate) storage: FileStorage,
    pub(crate) renderer: Arc<dyn TemplateRenderer>,
    pub(crate) converter: Option<Arc<dyn FormatConverter>>,
}

impl DocumentGenerator {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        documents: Arc<dyn DocumentStore>,
        storage: FileStorage,
        renderer: Arc<dyn TemplateRenderer>,
        converter: Option<Arc<dyn FormatConverter>>,
    ) -> DocumentGenerator {
        DocumentGenerator {
            templates,
            documents,
            storage,
            renderer,
            converter,
        }
    }

    /// Resolves a template row and checks its file is still on disk.
    pub(crate) fn template(&self, id: TemplateId) -> Result<Template, EngineError> {
        let template = self
            .templates
            .get(id)?
            .ok_or(EngineError::TemplateNotFound(id))?;
        if !template.file_path.exists() {
            return Err(EngineError::TemplateFileMissing(template.file_path.clone()));
        }
        Ok(template)
    }

    /// Renders a document, stores the output file and records its row.
    ///
    /// Without a parent the document is version 1; with one it takes the
    /// parent's version plus one, and the filename gains a `_v<version>`
    /// suffix. The version read and the row write are not atomic here; see
    /// [`DocumentStore::create`].
    pub fn generate(&self, request: GenerateRequest) -> Result<GeneratedDocument, EngineError> {
        let template = self.template(request.template_id)?;

        let version = match request.parent_id {
            None => 1,
            Some(parent_id) => {
                let parent = self
                    .documents
                    .get(parent_id)?
                    .ok_or(EngineError::ParentNotFound(parent_id))?;
                parent.version + 1
            }
        };

        let filename = naming::document_filename(
            request.owner_id,
            request.template_id,
            &request.title,
            version,
        );

        let mut context = RenderContext::from_vars(request.variables);
        context.apply_defaults(&ContextDefaults::for_document(request.title.clone()));

        let rendered = self.renderer.render(&template.file_path, &context)?;
        let path = self.storage.write(&filename, &rendered)?;

        let document = self.documents.create(NewDocument {
            title: request.title,
            template_id: request.template_id,
            owner_id: request.owner_id,
            file_path: path,
            version,
            parent_id: request.parent_id,
        })?;
        info!(
            "generated document {} (v{}) from template {}",
            document.id, document.version, template.id
        );
        Ok(document)
    }

    /// Renders and converts without persisting anything.
    pub fn preview(&self, request: PreviewRequest) -> Result<Vec<u8>, EngineError> {
        let template = self.template(request.template_id)?;

        let mut context = RenderContext::from_vars(request.variables);
        context.apply_defaults(&ContextDefaults::for_document(request.title));

        let rendered = self.renderer.render(&template.file_path, &context)?;
        self.convert(&rendered)
    }

    fn convert(&self, rendered: &[u8]) -> Result<Vec<u8>, EngineError> {
        let converter = self
            .converter
            .as_ref()
            .ok_or_else(|| ConversionError::Unavailable("no converter configured".into()))?;
        Ok(converter.convert(rendered)?)
    }

    /// Returns a stored document's bytes in the requested format.
    ///
    /// PDF conversions are cached in a sidecar file next to the original
    /// so repeat downloads skip the converter.
    pub fn download(&self, id: DocumentId, format: DownloadFormat) -> Result<Vec<u8>, EngineError> {
        let document = self
            .documents
            .get(id)?
            .ok_or(EngineError::DocumentNotFound(id))?;

        match format {
            DownloadFormat::Docx => Ok(std::fs::read(&document.file_path)?),
            DownloadFormat::Pdf => {
                let pdf_path = document.file_path.with_extension("pdf");
                if pdf_path.exists() {
                    return Ok(std::fs::read(&pdf_path)?);
                }
                let rendered = std::fs::read(&document.file_path)?;
                let converted = self.convert(&rendered)?;
                if let Err(e) = std::fs::write(&pdf_path, &converted) {
                    warn!("could not cache converted file {}: {}", pdf_path.display(), e);
                }
                Ok(converted)
            }
        }
    }

    /// Deletes a document and every descendant revision.
    ///
    /// Stored files and PDF sidecars are removed best-effort; metadata rows
    /// always go. Returns the deleted ids, root first.
    pub fn delete(&self, id: DocumentId) -> Result<Vec<DocumentId>, EngineError> {
        let root = self
            .documents
            .get(id)?
            .ok_or(EngineError::DocumentNotFound(id))?;

        // Breadth-first expansion over the revision tree.
        let mut subtree = vec![root];
        let mut index = 0;
        while index < subtree.len() {
            let children = self.documents.children(subtree[index].id)?;
            subtree.extend(children);
            index += 1;
        }

        // Leaves first so a failure partway leaves no orphaned rows.
        for document in subtree.iter().rev() {
            self.storage.remove(&document.file_path);
            let pdf_path = document.file_path.with_extension("pdf");
            if pdf_path.exists() {
                self.storage.remove(&pdf_path);
            }
            self.documents.delete(document.id)?;
        }

        let ids: Vec<DocumentId> = subtree.iter().map(|d| d.id).collect();
        info!(
            "deleted document {} and {} descendant(s)",
            id,
            ids.len() - 1
        );
        Ok(ids)
    }

    /// Fetches a document row.
    pub fn get(&self, id: DocumentId) -> Result<GeneratedDocument, EngineError> {
        self.documents
            .get(id)?
            .ok_or(EngineError::DocumentNotFound(id))
    }

    /// Lists documents matching the filter, newest first.
    pub fn list(&self, filter: &DocumentFilter) -> Result<Vec<GeneratedDocument>, EngineError> {
        Ok(self.documents.list(filter)?)
    }
}
