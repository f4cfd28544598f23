//! Tests for ServiceContainer wiring against a real document file

mod common;

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use formtree::config::Settings;
use formtree::domain::{Document, FieldKind, NewField, ParentRef, StepId};
use formtree::infrastructure::di::ServiceContainer;
use formtree::infrastructure::InfraError;

use common::{scenario_forest, Call, RecordingStore};

const DOCUMENT: &str = r#"{
  "questionnaire": {
    "id": "default",
    "name": "Default",
    "steps": [{"id": "s1", "label": "Step 1", "presentation_order": 0, "children": []}]
  },
  "templates": [],
  "contexts": [{"id": "c1", "name": "Default", "presentation_order": 0, "questionnaire_id": "default"}],
  "receivers": [{"id": "r1", "name": "Recipient"}]
}"#;

fn settings_for(temp: &TempDir) -> Settings {
    Settings {
        store_path: temp.path().join("document.json"),
        ..Settings::default()
    }
}

#[test]
fn given_document_when_opening_session_then_editor_and_contexts_loaded() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = settings_for(&temp);
    fs::write(&settings.store_path, DOCUMENT).unwrap();
    let container = ServiceContainer::new(settings).unwrap();

    // Act
    let session = container.open_session().unwrap();

    // Assert
    assert_eq!(session.editor.forest().questionnaire.steps.len(), 1);
    assert_eq!(session.contexts.contexts().len(), 1);
    assert_eq!(session.contexts.receivers().len(), 1);
}

#[test]
fn given_edit_in_one_session_when_opening_new_container_then_change_persisted() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = settings_for(&temp);
    fs::write(&settings.store_path, DOCUMENT).unwrap();
    let container = ServiceContainer::new(settings.clone()).unwrap();
    let mut session = container.open_session().unwrap();

    // Act
    let id = session
        .editor
        .add_field(
            &ParentRef::Step(StepId::new("s1")),
            NewField {
                label: "Email".into(),
                kind: FieldKind::Inputbox,
            },
        )
        .unwrap();

    // Assert
    let reopened = ServiceContainer::new(settings).unwrap();
    let session = reopened.open_session().unwrap();
    let field = session.editor.field(&id).unwrap();
    assert_eq!(field.label, "Email");
    assert!(field.attrs.contains_key("regexp"));
}

#[test]
fn given_malformed_document_when_creating_container_then_format_error() {
    let temp = TempDir::new().unwrap();
    let settings = settings_for(&temp);
    fs::write(&settings.store_path, "[]").unwrap();

    let result = ServiceContainer::new(settings);

    assert!(matches!(result, Err(InfraError::Format { .. })));
}

#[test]
fn given_injected_store_when_adding_field_then_schema_from_settings_and_store_called() {
    // Arrange
    let store = Arc::new(RecordingStore::new(Document {
        forest: scenario_forest(),
        ..Document::default()
    }));
    let settings = Settings {
        default_questionnaire: "custom".into(),
        ..Settings::default()
    };
    let container = ServiceContainer::with_deps(settings, store.clone());
    let mut session = container.open_session().unwrap();

    // Act
    let field = session
        .editor
        .add_field(
            &ParentRef::Step(StepId::new("s1")),
            NewField {
                label: "Email".into(),
                kind: FieldKind::Inputbox,
            },
        )
        .unwrap();
    let context = session.contexts.add_context("Second").unwrap();

    // Assert
    assert_eq!(session.editor.forest().questionnaire.steps[0].children.len(), 3);
    assert!(session.editor.field(&field).unwrap().attrs.contains_key("regexp"));
    assert_eq!(
        session.contexts.context(&context).unwrap().questionnaire_id,
        "custom"
    );
    assert!(matches!(store.calls()[0], Call::CreateField(_)));
}
