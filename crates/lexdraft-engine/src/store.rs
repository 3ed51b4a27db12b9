//! Template and document metadata stores
//!
//! Persistence is a collaborator, not a feature of this crate: the traits
//! model a plain key-value backend with the two queries the pipeline needs
//! (children, filtered listing). The in-memory implementations back tests
//! and the CLI. Every method returns a `Result` so database-backed
//! implementations can surface their own failures.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TemplateId = u64;
pub type DocumentId = u64;
pub type OwnerId = u64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Row not found: {0}")]
    NotFound(u64),

    #[error("Store backend failure: {0}")]
    Backend(String),
}

/// Metadata row for an uploaded template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub title: String,
    pub description: Option<String>,
    pub file_path: PathBuf,
    pub owner_id: OwnerId,
    /// Serialized field descriptors (see [`crate::schema`]); absent until
    /// the first explicit schema update.
    pub variables_schema: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub title: String,
    pub description: Option<String>,
    pub file_path: PathBuf,
    pub owner_id: OwnerId,
}

/// Metadata row for one generated document. Rows are immutable after
/// creation; lineage edits happen by generating new revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub id: DocumentId,
    pub title: String,
    pub template_id: TemplateId,
    pub owner_id: OwnerId,
    pub file_path: PathBuf,
    /// 1 for originals, parent version + 1 for revisions.
    pub version: u32,
    pub parent_id: Option<DocumentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub template_id: TemplateId,
    pub owner_id: OwnerId,
    pub file_path: PathBuf,
    pub version: u32,
    pub parent_id: Option<DocumentId>,
}

/// Conjunctive listing criteria for generated documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub owner_id: Option<OwnerId>,
    /// Case-insensitive title substring.
    pub title_contains: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

pub trait TemplateStore: Send + Sync {
    fn create(&self, new: NewTemplate) -> Result<Template, StoreError>;
    fn get(&self, id: TemplateId) -> Result<Option<Template>, StoreError>;
    fn update(&self, template: &Template) -> Result<(), StoreError>;
    fn delete(&self, id: TemplateId) -> Result<(), StoreError>;
    /// Newest first, optionally restricted to one owner.
    fn list(&self, owner_id: Option<OwnerId>) -> Result<Vec<Template>, StoreError>;
}

pub trait DocumentStore: Send + Sync {
    /// Inserts a pre-validated row. The caller computes the version from a
    /// prior parent read; that read/write window is not atomic at this
    /// seam, so a concurrent backend must assign versions transactionally.
    fn create(&self, new: NewDocument) -> Result<GeneratedDocument, StoreError>;
    fn get(&self, id: DocumentId) -> Result<Option<GeneratedDocument>, StoreError>;
    fn delete(&self, id: DocumentId) -> Result<(), StoreError>;
    /// Direct children only, in creation order.
    fn children(&self, parent_id: DocumentId) -> Result<Vec<GeneratedDocument>, StoreError>;
    /// Newest first.
    fn list(&self, filter: &DocumentFilter) -> Result<Vec<GeneratedDocument>, StoreError>;
}

struct MemoryTable<T> {
    rows: HashMap<u64, T>,
    next_id: u64,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        MemoryTable {
            rows: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T> MemoryTable<T> {
    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// A poisoned mutex still guards consistent data for these whole-row
// operations, so both stores recover the guard instead of failing.
fn recover<'a, T>(
    result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryTemplateStore {
    inner: Mutex<MemoryTable<Template>>,
}

impl MemoryTemplateStore {
    pub fn new() -> MemoryTemplateStore {
        MemoryTemplateStore::default()
    }

    fn table(&self) -> MutexGuard<'_, MemoryTable<Template>> {
        recover(self.inner.lock())
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn create(&self, new: NewTemplate) -> Result<Template, StoreError> {
        let mut table = self.table();
        let id = table.allocate();
        let template = Template {
            id,
            title: new.title,
            description: new.description,
            file_path: new.file_path,
            owner_id: new.owner_id,
            variables_schema: None,
            created_at: Utc::now(),
        };
        table.rows.insert(id, template.clone());
        Ok(template)
    }

    fn get(&self, id: TemplateId) -> Result<Option<Template>, StoreError> {
        Ok(self.table().rows.get(&id).cloned())
    }

    fn update(&self, template: &Template) -> Result<(), StoreError> {
        let mut table = self.table();
        match table.rows.get_mut(&template.id) {
            Some(row) => {
                *row = template.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(template.id)),
        }
    }

    fn delete(&self, id: TemplateId) -> Result<(), StoreError> {
        match self.table().rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn list(&self, owner_id: Option<OwnerId>) -> Result<Vec<Template>, StoreError> {
        let table = self.table();
        let mut templates: Vec<_> = table
            .rows
            .values()
            .filter(|t| owner_id.map_or(true, |owner| t.owner_id == owner))
            .cloned()
            .collect();
        templates.sort_by_key(|t| std::cmp::Reverse((t.created_at, t.id)));
        Ok(templates)
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: Mutex<MemoryTable<GeneratedDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> MemoryDocumentStore {
        MemoryDocumentStore::default()
    }

    fn table(&self) -> MutexGuard<'_, MemoryTable<GeneratedDocument>> {
        recover(self.inner.lock())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn create(&self, new: NewDocument) -> Result<GeneratedDocument, StoreError> {
        let mut table = self.table();
        let id = table.allocate();
        let document = GeneratedDocument {
            id,
            title: new.title,
            template_id: new.template_id,
            owner_id: new.owner_id,
            file_path: new.file_path,
            version: new.version,
            parent_id: new.parent_id,
            created_at: Utc::now(),
        };
        table.rows.insert(id, document.clone());
        Ok(document)
    }

    fn get(&self, id: DocumentId) -> Result<Option<GeneratedDocument>, StoreError> {
        Ok(self.table().rows.get(&id).cloned())
    }

    fn delete(&self, id: DocumentId) -> Result<(), StoreError> {
        match self.table().rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn children(&self, parent_id: DocumentId) -> Result<Vec<GeneratedDocument>, StoreError> {
        let table = self.table();
        let mut children: Vec<_> = table
            .rows
            .values()
            .filter(|d| d.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|d| d.id);
        Ok(children)
    }

    fn list(&self, filter: &DocumentFilter) -> Result<Vec<GeneratedDocument>, StoreError> {
        let needle = filter.title_contains.as_deref().map(str::to_lowercase);
        let table = self.table();
        let mut documents: Vec<_> = table
            .rows
            .values()
            .filter(|d| filter.owner_id.map_or(true, |owner| d.owner_id == owner))
            .filter(|d| {
                needle
                    .as_deref()
                    .map_or(true, |needle| d.title.to_lowercase().contains(needle))
            })
            .filter(|d| {
                filter
                    .created_after
                    .map_or(true, |after| d.created_at >= after)
            })
            .filter(|d| {
                filter
                    .created_before
                    .map_or(true, |before| d.created_at <= before)
            })
            .cloned()
            .collect();
        documents.sort_by_key(|d| std::cmp::Reverse((d.created_at, d.id)));
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_template(title: &str, owner_id: OwnerId) -> NewTemplate {
        NewTemplate {
            title: title.into(),
            description: None,
            file_path: PathBuf::from(format!("/tmp/{title}.docx")),
            owner_id,
        }
    }

    fn new_document(title: &str, parent_id: Option<DocumentId>, version: u32) -> NewDocument {
        NewDocument {
            title: title.into(),
            template_id: 1,
            owner_id: 1,
            file_path: PathBuf::from(format!("/tmp/{title}.docx")),
            version,
            parent_id,
        }
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let store = MemoryTemplateStore::new();
        let first = store.create(new_template("a", 1)).unwrap();
        let second = store.create(new_template("b", 1)).unwrap();
        assert_eq!((first.id, second.id), (1, 2));
    }

    #[test]
    fn update_replaces_the_row() {
        let store = MemoryTemplateStore::new();
        let mut template = store.create(new_template("a", 1)).unwrap();
        template.variables_schema = Some("[]".into());
        store.update(&template).unwrap();
        assert_eq!(
            store.get(template.id).unwrap().unwrap().variables_schema,
            Some("[]".into())
        );
    }

    #[test]
    fn update_and_delete_of_missing_rows_fail() {
        let store = MemoryTemplateStore::new();
        let ghost = Template {
            id: 99,
            title: "ghost".into(),
            description: None,
            file_path: PathBuf::new(),
            owner_id: 1,
            variables_schema: None,
            created_at: Utc::now(),
        };
        assert!(matches!(
            store.update(&ghost),
            Err(StoreError::NotFound(99))
        ));
        assert!(matches!(store.delete(99), Err(StoreError::NotFound(99))));
        assert!(store.get(99).unwrap().is_none());
    }

    #[test]
    fn template_listing_filters_by_owner() {
        let store = MemoryTemplateStore::new();
        store.create(new_template("mine", 1)).unwrap();
        store.create(new_template("theirs", 2)).unwrap();
        let mine = store.list(Some(1)).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
        assert_eq!(store.list(None).unwrap().len(), 2);
    }

    #[test]
    fn children_returns_direct_descendants_only() {
        let store = MemoryDocumentStore::new();
        let root = store.create(new_document("v1", None, 1)).unwrap();
        let child = store.create(new_document("v2", Some(root.id), 2)).unwrap();
        store
            .create(new_document("v3", Some(child.id), 3))
            .unwrap();

        let children = store.children(root.id).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
    }

    #[test]
    fn document_listing_applies_all_filters() {
        let store = MemoryDocumentStore::new();
        store.create(new_document("Lease Agreement", None, 1)).unwrap();
        store.create(new_document("Engagement", None, 1)).unwrap();

        let filter = DocumentFilter {
            title_contains: Some("lease".into()),
            ..DocumentFilter::default()
        };
        let found = store.list(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Lease Agreement");

        let future = DocumentFilter {
            created_after: Some(Utc::now() + chrono::Duration::hours(1)),
            ..DocumentFilter::default()
        };
        assert!(store.list(&future).unwrap().is_empty());
    }

    #[test]
    fn listing_is_newest_first() {
        let store = MemoryDocumentStore::new();
        store.create(new_document("first", None, 1)).unwrap();
        store.create(new_document("second", None, 1)).unwrap();
        let all = store.list(&DocumentFilter::default()).unwrap();
        // Same-instant timestamps fall back to id order, newest id first.
        assert_eq!(all[0].title, "second");
        assert_eq!(all[1].title, "first");
    }
}
