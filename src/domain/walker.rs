//! Queries over a forest of fields
//!
//! All tree searches go through here: pre-order flattening, ancestor chains,
//! lookups by id and locating the sibling set that owns a field.
//! Nothing in this module mutates the tree except through the returned `&mut`.

use tracing::instrument;

use crate::domain::{Field, FieldId};

/// Lazy pre-order traversal (each field before its children) across a forest.
///
/// Single pass; call [`flatten`] again to traverse once more.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    stack: Vec<&'a Field>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Field;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}

pub fn flatten(roots: &[Field]) -> Flatten<'_> {
    Flatten {
        stack: roots.iter().rev().collect(),
    }
}

/// Ids from the outermost ancestor down to `target` itself.
///
/// Roots are searched in order, children in order; the first path found wins.
/// Returns an empty chain when `target` is not in the forest.
#[instrument(level = "trace", skip(roots))]
pub fn ancestor_chain(target: &FieldId, roots: &[Field]) -> Vec<FieldId> {
    let mut path = Vec::new();
    if descend(target, roots, &mut path) {
        path
    } else {
        Vec::new()
    }
}

fn descend(target: &FieldId, fields: &[Field], path: &mut Vec<FieldId>) -> bool {
    for field in fields {
        path.push(field.id.clone());
        if &field.id == target || descend(target, &field.children, path) {
            return true;
        }
        path.pop();
    }
    false
}

pub fn find<'a>(roots: &'a [Field], id: &FieldId) -> Option<&'a Field> {
    flatten(roots).find(|f| &f.id == id)
}

pub fn find_mut<'a>(roots: &'a mut [Field], id: &FieldId) -> Option<&'a mut Field> {
    for field in roots.iter_mut() {
        if &field.id == id {
            return Some(field);
        }
        if let Some(found) = find_mut(&mut field.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn contains(roots: &[Field], id: &FieldId) -> bool {
    find(roots, id).is_some()
}

/// The sibling set owning `id` together with its index inside it.
pub fn siblings_mut<'a>(
    roots: &'a mut Vec<Field>,
    id: &FieldId,
) -> Option<(&'a mut Vec<Field>, usize)> {
    if let Some(idx) = roots.iter().position(|f| &f.id == id) {
        return Some((roots, idx));
    }
    for field in roots.iter_mut() {
        if let Some(found) = siblings_mut(&mut field.children, id) {
            return Some(found);
        }
    }
    None
}

/// Total number of fields in the forest.
pub fn count(roots: &[Field]) -> usize {
    roots.iter().map(|f| 1 + count(&f.children)).sum()
}

/// Ids of `field` and everything below it.
pub fn subtree_ids(field: &Field) -> Vec<FieldId> {
    flatten(std::slice::from_ref(field))
        .map(|f| f.id.clone())
        .collect()
}
