//! Attribute-schema lookup backed by settings

use std::sync::Arc;

use tracing::trace;

use crate::config::Settings;
use crate::domain::{Attrs, FieldKind};
use crate::infrastructure::traits::AttributeSchema;

/// Serves the per-kind attribute defaults from the loaded settings.
pub struct ConfiguredAttributeSchema {
    settings: Arc<Settings>,
}

impl ConfiguredAttributeSchema {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl AttributeSchema for ConfiguredAttributeSchema {
    fn field_attrs(&self, kind: FieldKind) -> Attrs {
        let attrs = self.settings.attrs_for(kind);
        trace!("field_attrs: kind={} keys={}", kind, attrs.len());
        attrs
    }
}
