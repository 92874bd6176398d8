use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::tree::Document;

/// Documents built from a form, keyed by model name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Documents(BTreeMap<String, Document>);

impl Documents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, model: &str) -> Option<&Document> {
        self.0.get(model)
    }

    pub fn get_mut(&mut self, model: &str) -> Option<&mut Document> {
        self.0.get_mut(model)
    }

    /// The document for `model`, created with a root element of that name on first use.
    pub fn get_or_insert(&mut self, model: &str) -> &mut Document {
        if !self.0.contains_key(model) {
            tracing::debug!(model, "creating document");
        }
        self.0
            .entry(model.to_string())
            .or_insert_with(|| Document::new(model))
    }

    pub fn insert(&mut self, model: impl Into<String>, document: Document) -> Option<Document> {
        self.0.insert(model.into(), document)
    }

    pub fn remove(&mut self, model: &str) -> Option<Document> {
        self.0.remove(model)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.0.contains_key(model)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Documents in model-name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Document> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Documents {
    type Item = (&'a String, &'a Document);
    type IntoIter = btree_map::Iter<'a, String, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
