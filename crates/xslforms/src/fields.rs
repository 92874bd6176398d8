//! Interpretation of submitted form fields as documents.
//!
//! Each field name is a path (see [`crate::path`]) naming a model and a
//! position inside its document. Walking the path creates whatever
//! structure is missing, so a form with fields like
//!
//! ```text
//! /zoo$1/name                  = "The Zoo"
//! /zoo$1/cage$2/name           = "mammals"
//! /zoo$1/cage$2/animal$1/name  = "Simon"
//! ```
//!
//! produces a `zoo` document whose first child slot is vacant and whose
//! second is a `cage` element holding an `animal`.

use std::fmt;
use std::str::FromStr;

use crate::documents::Documents;
use crate::error::FieldsError;
use crate::path::Component;
use crate::path::FieldPath;
use crate::path::SELECTOR_INDICATOR;
use crate::tree::Document;
use crate::tree::EnterError;
use crate::tree::NodeId;

/// Highest child position a field may address unless configured otherwise.
///
/// Filling the gap before a position allocates one slot per step, so a
/// single field must not be able to ask for an arbitrary number of them.
pub const DEFAULT_MAX_POSITION: usize = 10_000;

/// Character encoding applied to field values that arrive as raw bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
        }
    }

    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Self::Latin1 => Some(bytes.iter().copied().map(char::from).collect()),
        }
    }
}

impl FromStr for Encoding {
    type Err = FieldsError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" | "l1" => Ok(Self::Latin1),
            _ => Err(FieldsError::UnknownEncoding(label.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A submitted value, either already text or still raw request bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Single(RawValue),
    List(Vec<RawValue>),
}

impl FieldValue {
    #[must_use]
    pub fn first(&self) -> Option<&RawValue> {
        self.values().first()
    }

    #[must_use]
    pub fn values(&self) -> &[RawValue] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::List(values) => values,
        }
    }

    /// Add another value, turning a single value into a list.
    pub fn push(&mut self, value: RawValue) {
        match self {
            Self::List(values) => values.push(value),
            Self::Single(first) => {
                let first = std::mem::replace(first, RawValue::Bytes(Vec::new()));
                *self = Self::List(vec![first, value]);
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value.into())
    }
}

impl From<RawValue> for FieldValue {
    fn from(value: RawValue) -> Self {
        Self::Single(value)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A named form field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Converts field collections into documents and resolves selectors against them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldProcessor {
    encoding: Encoding,
    values_are_lists: bool,
    max_position: usize,
}

impl Default for FieldProcessor {
    fn default() -> Self {
        Self::new(Encoding::default(), false)
    }
}

impl FieldProcessor {
    /// `encoding` only applies to values given as bytes. With
    /// `values_are_lists` set, multivalue fields take every value of a field;
    /// otherwise only the first value of any field is used.
    #[must_use]
    pub fn new(encoding: Encoding, values_are_lists: bool) -> Self {
        Self {
            encoding,
            values_are_lists,
            max_position: DEFAULT_MAX_POSITION,
        }
    }

    /// Limit the child positions fields may address. Fields naming a higher
    /// position are skipped like any other malformed field.
    #[must_use]
    pub fn with_max_position(mut self, max_position: usize) -> Self {
        self.max_position = max_position;
        self
    }

    #[must_use]
    pub fn max_position(&self) -> usize {
        self.max_position
    }

    /// Whether every element step of `path` stays within the position limit.
    pub(crate) fn within_limits(&self, path: &FieldPath<'_>) -> bool {
        path.components().iter().all(|component| match *component {
            Component::Element { position, .. } => position <= self.max_position,
            _ => true,
        })
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[must_use]
    pub fn values_are_lists(&self) -> bool {
        self.values_are_lists
    }

    /// Make a new set of documents from `fields`.
    pub fn make_documents(&self, fields: &[Field]) -> Result<Documents, FieldsError> {
        let mut documents = Documents::new();
        self.complete_documents(&mut documents, fields)?;
        Ok(documents)
    }

    /// Extend `documents` with the structure and values described by `fields`.
    ///
    /// Selectors and fields that are not paths are skipped. On a structural
    /// conflict the error is returned at once; fields before it stay applied.
    pub fn complete_documents(
        &self,
        documents: &mut Documents,
        fields: &[Field],
    ) -> Result<(), FieldsError> {
        for field in fields {
            if field.name.contains(SELECTOR_INDICATOR) {
                continue;
            }

            let Some(path) = FieldPath::parse(&field.name) else {
                tracing::trace!(field = %field.name, "skipping field that is not a path");
                continue;
            };

            if path.position() != 1 {
                tracing::trace!(field = %field.name, "skipping field outside the document root");
                continue;
            }

            if !self.within_limits(&path) {
                tracing::debug!(
                    field = %field.name,
                    max_position = self.max_position,
                    "skipping field beyond the position limit"
                );
                continue;
            }

            let document = documents.get_or_insert(path.model());
            self.complete_field(document, &path, field)?;
        }
        Ok(())
    }

    fn complete_field(
        &self,
        document: &mut Document,
        path: &FieldPath<'_>,
        field: &Field,
    ) -> Result<(), FieldsError> {
        let mut node = document.root();

        for component in path.components() {
            match *component {
                Component::Element { name, position } => {
                    node = enter_element(document, node, name, position, &field.name)?;
                }
                Component::Attribute(attribute) => {
                    if let Some(raw) = field.value.first() {
                        let value = self.decode(raw, &field.name)?;
                        document.set_attribute(node, attribute, value);
                    }
                    break;
                }
                Component::Multivalue { element, attribute } => {
                    let all = field.value.values();
                    let raw_values = if self.values_are_lists {
                        all
                    } else {
                        &all[..all.len().min(1)]
                    };
                    let values = raw_values
                        .iter()
                        .map(|raw| self.decode(raw, &field.name))
                        .collect::<Result<Vec<_>, _>>()?;

                    for value in values {
                        let child = document.append_element(node, element);
                        document.set_attribute(child, attribute, value);
                    }
                    break;
                }
            }
        }
        Ok(())
    }

    /// Decode `raw` to text and drop carriage returns.
    fn decode(&self, raw: &RawValue, field: &str) -> Result<String, FieldsError> {
        let text = match raw {
            RawValue::Text(text) => text.replace('\r', ""),
            RawValue::Bytes(bytes) => self
                .encoding
                .decode(bytes)
                .ok_or_else(|| FieldsError::Decode {
                    field: field.to_string(),
                    encoding: self.encoding.label(),
                })?
                .replace('\r', ""),
        };
        Ok(text)
    }
}

/// Enter or create the element at `position` under `node`, naming `field` in any conflict.
pub(crate) fn enter_element(
    document: &mut Document,
    node: NodeId,
    name: &str,
    position: usize,
    field: &str,
) -> Result<NodeId, FieldsError> {
    document
        .enter_element(node, name, position)
        .map_err(|err| match err {
            EnterError::InvalidPosition => FieldsError::InvalidPosition {
                field: field.to_string(),
                position,
            },
            EnterError::Occupied(found) => {
                tracing::debug!(field, name, position, found = %found, "structural conflict");
                FieldsError::Conflict {
                    field: field.to_string(),
                    name: name.to_string(),
                    position,
                    found,
                }
            }
        })
}
