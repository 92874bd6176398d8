//! Field path protocol for XSLForms-style web forms.
//!
//! Form controls are named with paths into a document, and submitting the
//! form rebuilds that document from the flat list of named values:
//!
//! - [`path`]: the field name grammar
//! - [`fields`]: building documents from submitted fields
//! - [`selectors`]: looking up the nodes that selector fields point at
//! - [`output`]: the reverse direction, producing the field name for a node
//! - [`extensions`]: template functions exposing [`output`] to stylesheets
//! - [`form`]: one submission and its documents
//! - [`utils`]: adding and removing elements at selected positions
//! - [`xml`]: reading and writing documents as XML
//!
//! ## Example
//!
//! ```
//! use xslforms::output::{path_to_node, PathReference};
//! use xslforms::{Field, FieldProcessor, NodeRef};
//!
//! let documents = FieldProcessor::default()
//!     .make_documents(&[Field::new("/zoo$1/cage$2/name", "mammals")])
//!     .unwrap();
//!
//! let zoo = documents.get("zoo").unwrap();
//! let cage = zoo.find_element(zoo.root(), "cage", 2).unwrap();
//! assert_eq!(
//!     path_to_node(zoo, &NodeRef::Element(cage), PathReference::Attribute(Some("name"))),
//!     "/zoo$1/cage$2/name"
//! );
//! ```

mod documents;
mod error;
pub mod extensions;
pub mod fields;
pub mod form;
pub mod output;
pub mod path;
pub mod selectors;
mod tree;
pub mod utils;
pub mod xml;

pub use documents::Documents;
pub use error::FieldsError;
pub use error::XmlError;
pub use extensions::ExtensionError;
pub use extensions::TemplateFunction;
pub use extensions::TemplateValue;
pub use fields::Encoding;
pub use fields::DEFAULT_MAX_POSITION;
pub use fields::Field;
pub use fields::FieldProcessor;
pub use fields::FieldValue;
pub use fields::RawValue;
pub use form::Form;
pub use selectors::Selection;
pub use selectors::Selectors;
pub use tree::Document;
pub use tree::Element;
pub use tree::EnterError;
pub use tree::NodeId;
pub use tree::NodeRef;
pub use tree::Slot;
pub use tree::PLACEHOLDER_NAME;
