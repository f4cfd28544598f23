//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use formtree::config::{local_config_path, Settings};
use formtree::domain::FieldKind;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.default_questionnaire, "default");
    assert_eq!(
        settings.attrs_for(FieldKind::Textarea)["max_len"],
        json!(-1)
    );
    assert!(settings.attrs_for(FieldKind::Checkbox).is_empty());
}

#[test]
fn given_local_config_when_load_then_overrides_scalars_and_named_kinds() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let local = r#"
store_path = "/tmp/formtree-test/document.json"
default_questionnaire = "intake"

[attrs.date]
format = "iso"
"#;
    fs::write(local_config_path(dir.path()), local).unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(
        settings.store_path.to_string_lossy(),
        "/tmp/formtree-test/document.json"
    );
    assert_eq!(settings.default_questionnaire, "intake");
    assert_eq!(settings.attrs_for(FieldKind::Date)["format"], json!("iso"));
    assert_eq!(
        settings.attrs_for(FieldKind::Inputbox)["input_validation"],
        json!("none"),
        "kinds not named locally keep their defaults"
    );
}

#[test]
fn given_broken_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "store_path = [").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(result.is_err());
}

#[test]
fn given_settings_when_rendering_toml_then_parses_back() {
    let settings = Settings::default();

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}
