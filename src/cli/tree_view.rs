//! Terminal tree rendering of steps and fields

use termtree::Tree;

use crate::domain::{Field, Instance, Questionnaire, Step};

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

fn field_label(field: &Field) -> String {
    let mut label = format!("[{}] {} ({}, {})", field.y, field.label, field.kind, field.id);
    if field.instance == Instance::Reference {
        if let Some(template_id) = &field.template_id {
            label.push_str(&format!(" -> template {}", template_id));
        }
    }
    let triggers = field
        .options
        .iter()
        .filter(|o| o.trigger_field.is_some())
        .count();
    if !field.options.is_empty() {
        label.push_str(&format!(" options={}", field.options.len()));
    }
    if triggers > 0 {
        label.push_str(&format!(" triggers={}", triggers));
    }
    if field.shows_configuration() {
        label.push_str(" *");
    }
    label
}

impl TreeRender for Field {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(field_label(self)).with_leaves(leaves)
    }
}

impl TreeRender for Step {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(format!("[{}] {} (step, {})", self.presentation_order, self.label, self.id))
            .with_leaves(leaves)
    }
}

impl TreeRender for Questionnaire {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.steps.iter().map(|s| s.to_tree_string()).collect();
        Tree::new(format!("{} ({})", self.name, self.id)).with_leaves(leaves)
    }
}

/// Template library under a synthetic root.
pub fn library_tree(templates: &[Field]) -> Tree<String> {
    let leaves: Vec<_> = templates.iter().map(|t| t.to_tree_string()).collect();
    Tree::new("templates".to_string()).with_leaves(leaves)
}
