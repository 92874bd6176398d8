use crate::documents::Documents;
use crate::error::FieldsError;
use crate::fields::Field;
use crate::fields::FieldProcessor;
use crate::path::SELECTOR_INDICATOR;
use crate::selectors::Selection;
use crate::selectors::Selectors;
use crate::tree::Document;

/// The fields of one submission and the documents built from them.
#[derive(Clone, Debug, Default)]
pub struct Form {
    processor: FieldProcessor,
    parameters: Vec<Field>,
    documents: Documents,
}

impl Form {
    #[must_use]
    pub fn new(processor: FieldProcessor) -> Self {
        Self {
            processor,
            parameters: Vec::new(),
            documents: Documents::new(),
        }
    }

    #[must_use]
    pub fn processor(&self) -> FieldProcessor {
        self.processor
    }

    /// Replace the submitted fields and rebuild the documents from them.
    ///
    /// On a conflict the documents hold whatever the fields before it built.
    pub fn set_parameters(&mut self, parameters: Vec<Field>) -> Result<(), FieldsError> {
        self.parameters = parameters;
        self.documents = Documents::new();
        self.processor
            .complete_documents(&mut self.documents, &self.parameters)
    }

    /// The raw submitted fields, as opposed to the documents built from them.
    #[must_use]
    pub fn parameters(&self) -> &[Field] {
        &self.parameters
    }

    #[must_use]
    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut Documents {
        &mut self.documents
    }

    #[must_use]
    pub fn document(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    /// Resolve every selector field of the submission.
    pub fn selectors(&mut self, create: bool) -> Result<Selectors, FieldsError> {
        self.processor
            .get_selectors(&self.parameters, &mut self.documents, create)
    }

    /// Resolve only the fields named `name=...`.
    pub fn selector(&mut self, name: &str, create: bool) -> Result<Vec<Selection>, FieldsError> {
        let prefix = format!("{name}{SELECTOR_INDICATOR}");
        let fields: Vec<Field> = self
            .parameters
            .iter()
            .filter(|field| field.name.starts_with(&prefix))
            .cloned()
            .collect();

        let selectors = self
            .processor
            .get_selectors(&fields, &mut self.documents, create)?;
        Ok(selectors
            .get(name)
            .map(<[Selection]>::to_vec)
            .unwrap_or_default())
    }

    /// Store a fresh document with a root element `name`, replacing any existing one.
    pub fn new_instance(&mut self, name: &str) -> &mut Document {
        self.documents.insert(name, Document::new(name));
        self.documents.get_or_insert(name)
    }

    pub fn set_document(&mut self, name: &str, document: Document) {
        self.documents.insert(name, document);
    }
}
