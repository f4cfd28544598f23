//! JSON file backed persistence service
//!
//! Keeps the authoritative document in memory and writes it back after every
//! mutating request. Ids are assigned here on create (UUID v4).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{
    assign_order, walker, Context, ContextDraft, ContextId, Document, Field, FieldDraft, FieldId,
    FieldOption, Identified, OptionId, Positioned,
};
use crate::infrastructure::traits::{FileSystem, OrderRequest, OrderScope, PersistenceService};

pub struct JsonFileStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    document: Mutex<Document>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file starts from an empty document.
    pub fn open(fs: Arc<dyn FileSystem>, path: &Path) -> io::Result<Self> {
        let document = if fs.exists(path) {
            let content = fs.read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        } else {
            debug!("open: {} missing, starting empty", path.display());
            Document::default()
        };
        Ok(Self {
            fs,
            path: path.to_path_buf(),
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Document>> {
        self.document
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "store lock poisoned"))
    }

    /// Write through a sibling temp file so a crash never leaves half a document.
    fn flush(&self, document: &Document) -> io::Result<()> {
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.fs.ensure_parent(&self.path)?;
        let tmp = self.path.with_extension("json.tmp");
        self.fs.write(&tmp, &content)?;
        self.fs.rename(&tmp, &self.path)
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn assign_option_ids(options: &mut [FieldOption]) {
        for option in options.iter_mut().filter(|o| o.id.is_transient()) {
            option.id = OptionId::new(Self::new_id());
        }
    }
}

fn not_found(what: &str, id: &dyn std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found: {}", what, id))
}

fn require_id(id: &str, what: &str) -> io::Result<()> {
    if id.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no id", what),
        ));
    }
    Ok(())
}

/// Put `siblings` in the order given by `ids`, then renumber.
///
/// `ids` must name every sibling exactly once; otherwise nothing changes.
fn reorder<T: Identified + Positioned>(siblings: &mut Vec<T>, ids: &[String]) -> io::Result<()>
where
    T::Id: AsRef<str>,
{
    if ids.len() != siblings.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "order request names {} of {} siblings",
                ids.len(),
                siblings.len()
            ),
        ));
    }
    let mut positions = Vec::with_capacity(ids.len());
    for id in ids {
        let pos = siblings
            .iter()
            .position(|s| s.id().as_ref() == id)
            .ok_or_else(|| not_found("element", id))?;
        if positions.contains(&pos) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("duplicate id in order request: {}", id),
            ));
        }
        positions.push(pos);
    }

    let mut slots: Vec<Option<T>> = std::mem::take(siblings).into_iter().map(Some).collect();
    *siblings = positions
        .into_iter()
        .filter_map(|pos| slots[pos].take())
        .collect();
    assign_order(siblings);
    Ok(())
}

impl PersistenceService for JsonFileStore {
    fn load(&self) -> io::Result<Document> {
        Ok(self.lock()?.clone())
    }

    #[instrument(level = "debug", skip(self, draft), fields(parent = %draft.parent))]
    fn create_field(&self, draft: &FieldDraft) -> io::Result<Field> {
        let mut document = self.lock()?;
        let mut field = draft.field.clone();
        field.id = FieldId::new(Self::new_id());
        Self::assign_option_ids(&mut field.options);

        let siblings = document
            .forest
            .children_mut(&draft.parent)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))?;
        siblings.push(field.clone());

        self.flush(&document)?;
        debug!("create_field: id={}", field.id);
        Ok(field)
    }

    #[instrument(level = "debug", skip(self, field), fields(id = %field.id))]
    fn update_field(&self, field: &Field) -> io::Result<()> {
        require_id(field.id.as_str(), "field")?;
        let mut document = self.lock()?;
        let stored = document
            .forest
            .field_mut(&field.id)
            .ok_or_else(|| not_found("field", &field.id))?;

        // Children are managed through their own create/delete requests.
        let children = std::mem::take(&mut stored.children);
        *stored = field.clone();
        stored.children = children;
        Self::assign_option_ids(&mut stored.options);

        self.flush(&document)
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_field(&self, id: &FieldId) -> io::Result<()> {
        require_id(id.as_str(), "field")?;
        let mut document = self.lock()?;
        let (siblings, idx) = document
            .forest
            .siblings_mut(id)
            .ok_or_else(|| not_found("field", id))?;
        let removed = siblings.remove(idx);
        assign_order(siblings);
        debug!(
            "delete_field: removed {} node(s)",
            walker::count(std::slice::from_ref(&removed))
        );

        self.flush(&document)
    }

    #[instrument(level = "debug", skip(self, draft))]
    fn create_context(&self, draft: &ContextDraft) -> io::Result<Context> {
        let mut document = self.lock()?;
        let mut context = draft.context.clone();
        context.id = ContextId::new(Self::new_id());
        document.contexts.push(context.clone());

        self.flush(&document)?;
        Ok(context)
    }

    #[instrument(level = "debug", skip(self, context), fields(id = %context.id))]
    fn update_context(&self, context: &Context) -> io::Result<()> {
        require_id(context.id.as_str(), "context")?;
        let mut document = self.lock()?;
        let stored = document
            .contexts
            .iter_mut()
            .find(|c| c.id == context.id)
            .ok_or_else(|| not_found("context", &context.id))?;
        *stored = context.clone();

        self.flush(&document)
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_context(&self, id: &ContextId) -> io::Result<()> {
        require_id(id.as_str(), "context")?;
        let mut document = self.lock()?;
        let idx = document
            .contexts
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| not_found("context", id))?;
        document.contexts.remove(idx);
        assign_order(&mut document.contexts);

        self.flush(&document)
    }

    #[instrument(level = "debug", skip(self, request), fields(scope = ?request.scope))]
    fn order_elements(&self, request: &OrderRequest) -> io::Result<()> {
        if request.operation != OrderRequest::OPERATION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported operation: {}", request.operation),
            ));
        }
        let mut document = self.lock()?;
        let ids = &request.args.ids;
        match &request.scope {
            Some(OrderScope::Contexts) => reorder(&mut document.contexts, ids)?,
            Some(OrderScope::Steps) => reorder(&mut document.forest.questionnaire.steps, ids)?,
            Some(OrderScope::Fields(parent)) => {
                let siblings = document
                    .forest
                    .children_mut(parent)
                    .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))?;
                reorder(siblings, ids)?;
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "order request without scope",
                ))
            }
        }

        self.flush(&document)
    }
}
