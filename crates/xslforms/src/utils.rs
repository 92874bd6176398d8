//! Editing helpers applied to selector results, typically in response to an
//! "add" or "remove" button in a form.

use crate::documents::Documents;
use crate::selectors::Selection;
use crate::tree::NodeRef;

/// Add a new element under each selected element.
///
/// `element_names` lists the new element first, followed by the elements
/// it should be nested in, innermost first. Each of those containers is
/// reused if the selected element already has one and appended otherwise.
/// With `["animal", "animals"]`, a selected `cage` gains a new `animal`
/// inside its first `animals` child.
///
/// Attribute selections and selections for missing documents are ignored.
pub fn add_elements(documents: &mut Documents, selections: &[Selection], element_names: &[&str]) {
    let Some((leaf, containers)) = element_names.split_first() else {
        return;
    };

    for selection in selections {
        let NodeRef::Element(mut node) = selection.node else {
            continue;
        };
        let Some(document) = documents.get_mut(&selection.model) else {
            continue;
        };

        for name in containers.iter().rev() {
            node = match document.find_child(node, name) {
                Some(existing) => existing,
                None => document.append_element(node, name),
            };
        }
        let added = document.append_element(node, leaf);
        tracing::debug!(model = %selection.model, element = leaf, id = added.id(), "added element");
    }
}

/// Detach each selected element from its parent.
///
/// Later siblings move up one position. Selecting the same element twice,
/// or the root, removes nothing further.
pub fn remove_elements(documents: &mut Documents, selections: &[Selection]) {
    for selection in selections {
        let NodeRef::Element(node) = selection.node else {
            continue;
        };
        if let Some(document) = documents.get_mut(&selection.model) {
            if document.detach(node) {
                tracing::debug!(model = %selection.model, id = node.id(), "removed element");
            }
        }
    }
}
