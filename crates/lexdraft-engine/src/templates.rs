//! Template catalog operations
//!
//! Wraps a [`TemplateStore`] with the operations the document pipeline and
//! the CLI share: registration, detail and schema updates, and placeholder
//! discovery against the stored file.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::EngineError;
use crate::schema::{self, FieldDescriptor};
use crate::store::{NewTemplate, OwnerId, Template, TemplateId, TemplateStore};

pub struct TemplateManager {
    templates: Arc<dyn TemplateStore>,
}

impl TemplateManager {
    pub fn new(templates: Arc<dyn TemplateStore>) -> TemplateManager {
        TemplateManager { templates }
    }

    pub fn register(&self, new: NewTemplate) -> Result<Template, EngineError> {
        let template = self.templates.create(new)?;
        info!("registered template {} ({})", template.id, template.title);
        Ok(template)
    }

    pub fn get(&self, id: TemplateId) -> Result<Template, EngineError> {
        self.templates
            .get(id)?
            .ok_or(EngineError::TemplateNotFound(id))
    }

    pub fn list(&self, owner_id: Option<OwnerId>) -> Result<Vec<Template>, EngineError> {
        Ok(self.templates.list(owner_id)?)
    }

    /// Removes the catalog row only. The template file and any documents
    /// generated from it stay in place.
    pub fn delete(&self, id: TemplateId) -> Result<(), EngineError> {
        let template = self.get(id)?;
        self.templates.delete(id)?;
        info!("deleted template {} ({})", template.id, template.title);
        Ok(())
    }

    pub fn update_details(
        &self,
        id: TemplateId,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Template, EngineError> {
        let mut template = self.get(id)?;
        if let Some(title) = title {
            template.title = title;
        }
        if let Some(description) = description {
            template.description = Some(description);
        }
        self.templates.update(&template)?;
        Ok(template)
    }

    /// Replaces the stored form schema for a template.
    pub fn update_schema(
        &self,
        id: TemplateId,
        fields: &[FieldDescriptor],
    ) -> Result<Template, EngineError> {
        let mut template = self.get(id)?;
        template.variables_schema = Some(schema::to_json(fields)?);
        self.templates.update(&template)?;
        info!("updated schema for template {} ({} fields)", id, fields.len());
        Ok(template)
    }

    /// Returns the stored form schema, or `None` when no schema has been
    /// saved for the template yet.
    pub fn schema(&self, id: TemplateId) -> Result<Option<Vec<FieldDescriptor>>, EngineError> {
        let template = self.get(id)?;
        match template.variables_schema {
            Some(json) => Ok(Some(schema::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Extracts `{{variable}}` placeholders from the stored template file.
    /// A catalog row whose file has gone missing yields an empty list so
    /// callers can still render template details.
    pub fn variables(&self, id: TemplateId) -> Result<Vec<String>, EngineError> {
        let template = self.get(id)?;
        if !template.file_path.exists() {
            warn!(
                "template {} file missing at {}",
                id,
                template.file_path.display()
            );
            return Ok(Vec::new());
        }
        Ok(lexdraft_docx::extract_from_path(&template.file_path))
    }
}
