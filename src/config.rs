//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/formtree/formtree.toml`
//! 3. Local config: `<dir>/.formtree.toml`
//! 4. Environment variables: `FORMTREE_*` prefix (`__` separates nested keys)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::ApplicationError;
use crate::domain::{Attrs, FieldKind};

/// Default attributes per field kind, keyed by kind name.
pub type AttrsByKind = BTreeMap<String, Attrs>;

/// Raw settings for intermediate parsing (`None` → not specified, inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub default_questionnaire: Option<String>,
    pub attrs: Option<AttrsByKind>,
}

/// Unified configuration for formtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// JSON document holding questionnaire, templates and contexts
    pub store_path: PathBuf,
    /// Questionnaire assigned to newly created contexts
    pub default_questionnaire: String,
    /// Attributes given to new fields, per kind
    pub attrs: AttrsByKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_questionnaire: "default".into(),
            attrs: default_attrs(),
        }
    }
}

fn default_store_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".formtree").join("document.json"))
        .unwrap_or_else(|| PathBuf::from("~/.formtree/document.json"))
}

fn default_attrs() -> AttrsByKind {
    let text_limits = |extra: &[(&str, serde_json::Value)]| -> Attrs {
        let mut attrs: Attrs = [
            ("min_len".to_string(), json!(-1)),
            ("max_len".to_string(), json!(-1)),
        ]
        .into_iter()
        .collect();
        attrs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.clone())));
        attrs
    };

    let mut attrs = AttrsByKind::new();
    attrs.insert(
        FieldKind::Inputbox.to_string(),
        text_limits(&[
            ("regexp", json!("")),
            ("input_validation", json!("none")),
        ]),
    );
    attrs.insert(FieldKind::Textarea.to_string(), text_limits(&[]));
    attrs.insert(
        FieldKind::Tos.to_string(),
        [("text".to_string(), json!(""))].into_iter().collect(),
    );
    attrs
}

/// Get the XDG config directory for formtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "formtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("formtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".formtree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Attributes: overlay replaces the whole bag of each kind it names
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut attrs = self.attrs.clone();
        if let Some(extra) = &overlay.attrs {
            attrs.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            default_questionnaire: overlay
                .default_questionnaire
                .clone()
                .unwrap_or_else(|| self.default_questionnaire.clone()),
            attrs,
        }
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_path.to_string_lossy().as_ref());
        self.store_path = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.formtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply FORMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FORMTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_questionnaire") {
            settings.default_questionnaire = val;
        }

        Ok(settings)
    }

    /// Default attributes for `kind`; kinds without an entry get an empty bag.
    pub fn attrs_for(&self, kind: FieldKind) -> Attrs {
        self.attrs.get(kind.as_str()).cloned().unwrap_or_default()
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_overlay_attrs_when_merging_then_replaces_named_kinds_only() {
        let base = Settings::default();
        let mut overlay_attrs = AttrsByKind::new();
        overlay_attrs.insert(
            "textarea".into(),
            [("max_len".to_string(), json!(500))].into_iter().collect(),
        );
        let overlay = RawSettings {
            attrs: Some(overlay_attrs),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.attrs_for(FieldKind::Textarea).len(), 1);
        assert_eq!(
            merged.attrs_for(FieldKind::Textarea)["max_len"],
            json!(500)
        );
        assert_eq!(
            merged.attrs_for(FieldKind::Inputbox),
            base.attrs_for(FieldKind::Inputbox)
        );
        assert!(merged.attrs_for(FieldKind::Date).is_empty());
    }
}
