use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::documents::Documents;
use crate::error::FieldsError;
use crate::fields::enter_element;
use crate::fields::Field;
use crate::fields::FieldProcessor;
use crate::path::split_selector;
use crate::path::Component;
use crate::path::FieldPath;
use crate::tree::Document;
use crate::tree::NodeRef;

/// A node picked out by a selector field, together with the document holding it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub model: String,
    pub node: NodeRef,
}

/// Selector names mapped to the nodes their fields resolved to, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Selectors(BTreeMap<String, Vec<Selection>>);

impl Selectors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[Selection]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<Selection>> {
        self.0.iter()
    }

    fn entry(&mut self, name: &str) -> &mut Vec<Selection> {
        self.0.entry(name.to_string()).or_default()
    }
}

impl<'a> IntoIterator for &'a Selectors {
    type Item = (&'a String, &'a Vec<Selection>);
    type IntoIter = btree_map::Iter<'a, String, Vec<Selection>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FieldProcessor {
    /// Resolve the selector fields in `fields` against `documents`.
    ///
    /// With `create` set, missing elements along a selector path are created
    /// as [`FieldProcessor::complete_documents`] would; otherwise a path that
    /// runs off the existing structure contributes nothing.
    pub fn get_selectors(
        &self,
        fields: &[Field],
        documents: &mut Documents,
        create: bool,
    ) -> Result<Selectors, FieldsError> {
        let mut selectors = Selectors::new();
        self.complete_selectors(&mut selectors, fields, documents, create)?;
        Ok(selectors)
    }

    /// Add the selections described by `fields` to `selectors`.
    ///
    /// A selector whose document exists is always recorded by name, even if
    /// its path resolves to nothing.
    pub fn complete_selectors(
        &self,
        selectors: &mut Selectors,
        fields: &[Field],
        documents: &mut Documents,
        create: bool,
    ) -> Result<(), FieldsError> {
        for field in fields {
            let Some((selector_name, path)) = split_selector(&field.name) else {
                continue;
            };

            let Some(path) = FieldPath::parse(path) else {
                tracing::trace!(field = %field.name, "skipping selector without a path");
                continue;
            };

            let Some(document) = documents.get_mut(path.model()) else {
                tracing::trace!(field = %field.name, "skipping selector for missing document");
                continue;
            };

            let node = if create && !self.within_limits(&path) {
                tracing::debug!(field = %field.name, "selector beyond the position limit");
                None
            } else {
                resolve(document, &path, create, &field.name)?
            };
            let selections = selectors.entry(selector_name);
            if let Some(node) = node {
                selections.push(Selection {
                    model: path.model().to_string(),
                    node,
                });
            }
        }
        Ok(())
    }
}

fn resolve(
    document: &mut Document,
    path: &FieldPath<'_>,
    create: bool,
    field: &str,
) -> Result<Option<NodeRef>, FieldsError> {
    if path.position() != 1 {
        return Ok(None);
    }

    let mut node = document.root();
    for component in path.components() {
        match *component {
            Component::Element { name, position } => {
                if create {
                    node = enter_element(document, node, name, position, field)?;
                } else {
                    let Some(child) = document.find_element(node, name, position) else {
                        return Ok(None);
                    };
                    node = child;
                }
            }
            Component::Attribute(attribute) => {
                let found = document.attribute(node, attribute).is_some();
                return Ok(found.then(|| NodeRef::attribute(node, attribute)));
            }
            Component::Multivalue { .. } => return Ok(None),
        }
    }
    Ok(Some(NodeRef::Element(node)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Slot;

    fn build(fields: &[Field]) -> Documents {
        FieldProcessor::default().make_documents(fields).unwrap()
    }

    fn zoo_fields() -> Vec<Field> {
        vec![
            Field::new("/zoo$1/cage$1/name", "reptiles"),
            Field::new("/zoo$1/cage$2/name", "mammals"),
            Field::new("/zoo$1/cage$2/animal$1/name", "Simon"),
        ]
    }

    mod lookup {
        use super::*;

        #[test]
        fn test_resolves_elements() {
            let fields = zoo_fields();
            let mut documents = build(&fields);
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[Field::new("_action_delete=/zoo$1/cage$2", "Delete")],
                    &mut documents,
                    false,
                )
                .unwrap();

            let zoo = documents.get("zoo").unwrap();
            let cage = zoo.find_element(zoo.root(), "cage", 2).unwrap();
            assert_eq!(
                selectors.get("_action_delete"),
                Some(
                    &[Selection {
                        model: "zoo".to_string(),
                        node: NodeRef::Element(cage),
                    }][..]
                )
            );
        }

        #[test]
        fn test_resolves_attributes() {
            let fields = zoo_fields();
            let mut documents = build(&fields);
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[
                        Field::new("edit=/zoo$1/cage$1/name", ""),
                        Field::new("edit=/zoo$1/cage$1/missing", ""),
                    ],
                    &mut documents,
                    false,
                )
                .unwrap();

            let zoo = documents.get("zoo").unwrap();
            let cage = zoo.find_element(zoo.root(), "cage", 1).unwrap();
            let selections = selectors.get("edit").unwrap();
            assert_eq!(selections.len(), 1);
            assert_eq!(selections[0].node, NodeRef::attribute(cage, "name"));
        }

        #[test]
        fn test_past_the_end_is_an_empty_match() {
            let fields = zoo_fields();
            let mut documents = build(&fields);
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[Field::new("_action_nasty=/zoo$1/cage$3", "x")],
                    &mut documents,
                    false,
                )
                .unwrap();

            assert_eq!(selectors.get("_action_nasty"), Some(&[][..]));
            let zoo = documents.get("zoo").unwrap();
            assert_eq!(zoo.children(zoo.root()).len(), 2);
        }

        #[test]
        fn test_wrong_name_is_an_empty_match() {
            let fields = zoo_fields();
            let mut documents = build(&fields);
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[Field::new("pick=/zoo$1/funding$1", "x")],
                    &mut documents,
                    false,
                )
                .unwrap();
            assert_eq!(selectors.get("pick"), Some(&[][..]));
        }

        #[test]
        fn test_missing_document_is_skipped() {
            let mut documents = build(&zoo_fields());
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[Field::new("pick=/museum$1/hall$1", "x")],
                    &mut documents,
                    false,
                )
                .unwrap();
            assert!(!selectors.contains("pick"));
        }

        #[test]
        fn test_multivalue_component_does_not_resolve() {
            let mut documents = build(&zoo_fields());
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[Field::new("pick=/zoo$1/cage$1/tag$$value", "x")],
                    &mut documents,
                    false,
                )
                .unwrap();
            assert_eq!(selectors.get("pick"), Some(&[][..]));
        }

        #[test]
        fn test_duplicate_names_accumulate() {
            let mut documents = build(&zoo_fields());
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[
                        Field::new("pick=/zoo$1/cage$1", "x"),
                        Field::new("/zoo$1/name", "not a selector"),
                        Field::new("pick=/zoo$1/cage$2", "x"),
                    ],
                    &mut documents,
                    false,
                )
                .unwrap();
            assert_eq!(selectors.len(), 1);
            assert_eq!(selectors.get("pick").unwrap().len(), 2);
        }

        #[test]
        fn test_serializes_by_name() {
            let mut documents = build(&zoo_fields());
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[
                        Field::new("_action_delete=/zoo$1/cage$2", "x"),
                        Field::new("edit=/zoo$1/cage$1/name", "x"),
                    ],
                    &mut documents,
                    false,
                )
                .unwrap();

            insta::assert_snapshot!(
                serde_json::to_string(&selectors).unwrap(),
                @r#"{"_action_delete":[{"model":"zoo","node":{"Element":2}}],"edit":[{"model":"zoo","node":{"Attribute":{"owner":1,"name":"name"}}}]}"#
            );
        }
    }

    mod creation {
        use super::*;

        #[test]
        fn test_create_builds_missing_structure() {
            let mut documents = build(&zoo_fields());
            let selectors = FieldProcessor::default()
                .get_selectors(
                    &[Field::new("_action_add=/zoo$1/cage$4/animal$2", "x")],
                    &mut documents,
                    true,
                )
                .unwrap();

            let zoo = documents.get("zoo").unwrap();
            let children = zoo.children(zoo.root());
            assert_eq!(children.len(), 4);
            assert_eq!(children[2], Slot::Vacant);
            let cage = children[3].element().unwrap();
            let animal = zoo.find_element(cage, "animal", 2).unwrap();
            assert_eq!(
                selectors.get("_action_add").unwrap()[0].node,
                NodeRef::Element(animal)
            );
        }

        #[test]
        fn test_create_stops_at_position_limit() {
            let mut documents = build(&zoo_fields());
            let selectors = FieldProcessor::default()
                .with_max_position(10)
                .get_selectors(
                    &[Field::new("_action_add=/zoo$1/cage$11", "x")],
                    &mut documents,
                    true,
                )
                .unwrap();

            assert_eq!(selectors.get("_action_add"), Some(&[][..]));
            let zoo = documents.get("zoo").unwrap();
            assert_eq!(zoo.children(zoo.root()).len(), 2);
        }

        #[test]
        fn test_create_reports_conflicts() {
            let mut documents = build(&zoo_fields());
            let result = FieldProcessor::default().get_selectors(
                &[Field::new("pick=/zoo$1/funding$1", "x")],
                &mut documents,
                true,
            );
            assert!(matches!(result, Err(FieldsError::Conflict { .. })));
        }
    }
}
