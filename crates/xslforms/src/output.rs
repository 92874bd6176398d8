//! Field names for positions in built documents.
//!
//! This is the inverse of [`crate::fields`]: given a node, produce the field
//! name a form control must carry so that submitting it addresses the same
//! node again.

use crate::path::MULTI_SEPARATOR;
use crate::path::PAIR_SEPARATOR;
use crate::path::PATH_SEPARATOR;
use crate::tree::Document;
use crate::tree::NodeRef;

/// What kind of field name to produce for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathReference<'a> {
    /// `/zoo$1/cage$2`: the element itself.
    Element,
    /// `/zoo$1/cage$2/name`: an attribute of the element.
    ///
    /// Without a name, the element is addressed as if it were an attribute
    /// of its parent: `/zoo$1/cage`.
    Attribute(Option<&'a str>),
    /// `/package$1/categories$1/category$$value`: the element is one of a
    /// repeating group under its parent, holding its value in the named attribute.
    MultiAttribute(&'a str),
    /// `/package$1/categories$1/category$$value`: a repeating group of
    /// `element` children under the element itself.
    ListAttribute {
        element: &'a str,
        attribute: &'a str,
    },
}

/// Produce the field name for `node` in `document`.
///
/// Attribute nodes are addressed through their owning element. Every
/// element up to and including the root contributes a `name$n` step, with
/// `n` counting all child slots of its parent, so positions match the ones
/// the field processor assigns.
#[must_use]
pub fn path_to_node(document: &Document, node: &NodeRef, reference: PathReference<'_>) -> String {
    let mut current = Some(node.element());
    let mut suffix = String::new();

    match reference {
        PathReference::Element => {}
        PathReference::Attribute(Some(name)) => {
            suffix = format!("{PATH_SEPARATOR}{name}");
        }
        PathReference::Attribute(None) => {
            let element = node.element();
            suffix = format!("{PATH_SEPARATOR}{}", document.name(element));
            current = document.parent(element);
        }
        PathReference::MultiAttribute(name) => {
            let element = node.element();
            suffix = format!(
                "{PATH_SEPARATOR}{}{MULTI_SEPARATOR}{name}",
                document.name(element)
            );
            current = document.parent(element);
        }
        PathReference::ListAttribute { element, attribute } => {
            suffix = format!("{PATH_SEPARATOR}{element}{MULTI_SEPARATOR}{attribute}");
        }
    }

    let mut steps = Vec::new();
    while let Some(id) = current {
        steps.push(format!(
            "{PATH_SEPARATOR}{}{PAIR_SEPARATOR}{}",
            document.name(id),
            document.position(id)
        ));
        current = document.parent(id);
    }
    steps.reverse();

    let mut path = steps.concat();
    path.push_str(&suffix);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;
    use crate::fields::FieldProcessor;
    use crate::tree::NodeId;

    fn package() -> (Document, NodeId, NodeId) {
        let documents = FieldProcessor::new(crate::fields::Encoding::Utf8, true)
            .make_documents(&[
                Field::new("/package$1/name", "xslforms"),
                Field::new("/package$1/categories$2/category$$value", vec!["a", "b"]),
            ])
            .unwrap();
        let document = documents.get("package").unwrap().clone();
        let categories = document
            .find_element(document.root(), "categories", 2)
            .unwrap();
        let second = document.child_elements(categories).nth(1).unwrap();
        (document, categories, second)
    }

    #[test]
    fn test_element_reference() {
        let (document, categories, _) = package();
        assert_eq!(
            path_to_node(
                &document,
                &NodeRef::Element(categories),
                PathReference::Element
            ),
            "/package$1/categories$2"
        );
        assert_eq!(
            path_to_node(
                &document,
                &NodeRef::Element(document.root()),
                PathReference::Element
            ),
            "/package$1"
        );
    }

    #[test]
    fn test_attribute_node_is_addressed_through_owner() {
        let (document, categories, _) = package();
        let node = NodeRef::attribute(categories, "label");
        assert_eq!(
            path_to_node(&document, &node, PathReference::Element),
            "/package$1/categories$2"
        );
        assert_eq!(
            path_to_node(&document, &node, PathReference::Attribute(Some("label"))),
            "/package$1/categories$2/label"
        );
    }

    #[test]
    fn test_unnamed_attribute_uses_element_name() {
        let (document, categories, _) = package();
        assert_eq!(
            path_to_node(
                &document,
                &NodeRef::Element(categories),
                PathReference::Attribute(None)
            ),
            "/package$1/categories"
        );
    }

    #[test]
    fn test_multi_attribute_folds_repeating_element() {
        let (document, _, second) = package();
        assert_eq!(
            path_to_node(
                &document,
                &NodeRef::Element(second),
                PathReference::MultiAttribute("value")
            ),
            "/package$1/categories$2/category$$value"
        );
    }

    #[test]
    fn test_list_attribute_keeps_context_element() {
        let (document, categories, _) = package();
        assert_eq!(
            path_to_node(
                &document,
                &NodeRef::Element(categories),
                PathReference::ListAttribute {
                    element: "category",
                    attribute: "value"
                }
            ),
            "/package$1/categories$2/category$$value"
        );
    }

    #[test]
    fn test_positions_count_vacant_slots() {
        let (document, categories, _) = package();
        assert!(document.children(document.root())[0].is_vacant());
        assert_eq!(document.position(categories), 2);
    }
}
