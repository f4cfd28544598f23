//! Service container for dependency injection
//!
//! Wires up the store, the attribute schema and the session services.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{ContextService, FieldTreeEditor};
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::schema::ConfiguredAttributeSchema;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::traits::{
    AttributeSchema, FileSystem, PersistenceService, RealFileSystem,
};

/// Container holding the shared services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Persistence service holding the authoritative document
    pub store: Arc<dyn PersistenceService>,

    /// Per-kind attribute defaults for new fields
    pub schema: Arc<dyn AttributeSchema>,
}

/// Editing session over one loaded document.
pub struct Session {
    pub editor: FieldTreeEditor,
    pub contexts: ContextService,
}

impl ServiceContainer {
    /// Create a container backed by the JSON document at `settings.store_path`.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = JsonFileStore::open(fs, &settings.store_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                InfraError::Format {
                    path: settings.store_path.display().to_string(),
                    message: e.to_string(),
                }
            } else {
                InfraError::io(format!("open store {}", settings.store_path.display()), e)
            }
        })?;
        Ok(Self::with_deps(settings, Arc::new(store)))
    }

    /// Create a service container with a custom store (for testing).
    pub fn with_deps(settings: Settings, store: Arc<dyn PersistenceService>) -> Self {
        let settings = Arc::new(settings);
        let schema = Arc::new(ConfiguredAttributeSchema::new(settings.clone()));

        Self {
            settings,
            store,
            schema,
        }
    }

    /// Load the document and hand it to a fresh editor and context service.
    pub fn open_session(&self) -> InfraResult<Session> {
        let document = self
            .store
            .load()
            .map_err(|e| InfraError::io("load document", e))?;
        debug!(
            "open_session: steps={} templates={} contexts={}",
            document.forest.questionnaire.steps.len(),
            document.forest.templates.len(),
            document.contexts.len()
        );
        let editor = FieldTreeEditor::new(self.store.clone(), self.schema.clone(), document.forest);
        let contexts = ContextService::new(
            self.store.clone(),
            self.settings.default_questionnaire.clone(),
            document.contexts,
            document.receivers,
        );
        Ok(Session { editor, contexts })
    }
}
