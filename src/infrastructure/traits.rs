//! I/O boundary traits for testability
//!
//! These traits abstract the persistence service, the attribute-schema lookup and
//! the filesystem, allowing services to be tested with mock implementations.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{
    Attrs, Context, ContextDraft, ContextId, Document, Field, FieldDraft, FieldId, FieldKind,
    ParentRef,
};

/// Sibling set targeted by a batch reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    Contexts,
    Steps,
    /// Children of a step, a field or the template library
    Fields(ParentRef),
}

/// Batch reorder request: one per reorder action, carrying the full id list.
///
/// Serializes to `{"operation": "order_elements", "args": {"ids": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(skip)]
    pub scope: Option<OrderScope>,
    pub operation: String,
    pub args: OrderArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderArgs {
    pub ids: Vec<String>,
}

impl OrderRequest {
    pub const OPERATION: &'static str = "order_elements";

    pub fn new(scope: OrderScope, ids: Vec<String>) -> Self {
        Self {
            scope: Some(scope),
            operation: Self::OPERATION.to_string(),
            args: OrderArgs { ids },
        }
    }
}

/// Persistence service owning the authoritative copy of the document.
///
/// Every call is a single request; the service assigns ids on create.
pub trait PersistenceService: Send + Sync {
    /// Supply the initial document.
    fn load(&self) -> io::Result<Document>;

    /// Create a field below `draft.parent`, returning it with its assigned id.
    fn create_field(&self, draft: &FieldDraft) -> io::Result<Field>;

    /// Replace a field's own data. Fails if the id is empty or unknown.
    fn update_field(&self, field: &Field) -> io::Result<()>;

    /// Delete a field and everything below it.
    fn delete_field(&self, id: &FieldId) -> io::Result<()>;

    fn create_context(&self, draft: &ContextDraft) -> io::Result<Context>;

    /// Fails if the id is empty or unknown.
    fn update_context(&self, context: &Context) -> io::Result<()>;

    fn delete_context(&self, id: &ContextId) -> io::Result<()>;

    /// Persist the order of a whole sibling set in one request.
    fn order_elements(&self, request: &OrderRequest) -> io::Result<()>;
}

/// Lookup of default attributes per field kind.
pub trait AttributeSchema: Send + Sync {
    fn field_attrs(&self, kind: FieldKind) -> Attrs;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}
