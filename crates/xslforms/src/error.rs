use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldsError {
    /// Structural Conflict
    ///
    /// A field addresses a position already holding an element with a
    /// different name. Positions are assigned by the first field that names
    /// them, so this usually means a template emits inconsistent field names
    /// for the same level, for example `/zoo$1/cage$1/name` alongside
    /// `/zoo$1/funding$1/type`.
    #[error(
        "In field '{field}', name '{name}' at position {position} could not be added, since '{found}' was found"
    )]
    Conflict {
        field: String,
        name: String,
        position: usize,
        found: String,
    },

    /// A position below 1 reached the tree. Parsed paths never carry one.
    #[error("In field '{field}', position {position} is not a valid position")]
    InvalidPosition { field: String, position: usize },

    /// A raw byte value is not valid in the configured encoding.
    #[error("In field '{field}', a value could not be decoded as {encoding}")]
    Decode {
        field: String,
        encoding: &'static str,
    },

    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),
}

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML syntax error")]
    Syntax(#[from] quick_xml::Error),
    #[error("Malformed attribute")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("Failed to write XML")]
    Io(#[from] std::io::Error),
    #[error("Element or attribute name is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Document has no root element")]
    NoRootElement,
    #[error("Document has more than one root element, found '{0}'")]
    MultipleRoots(String),
    #[error("The root element cannot be a {}", crate::tree::PLACEHOLDER_NAME)]
    PlaceholderRoot,
    #[error(
        "An element is named '{}', which is reserved for vacant slots",
        crate::tree::PLACEHOLDER_NAME
    )]
    PlaceholderElement,
}
