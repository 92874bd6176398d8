//! Field path grammar.
//!
//! Field names address positions in a document using three delimiters:
//!
//! ```text
//! /zoo$1/cage$2/name                     attribute on an element
//! /package$1/categories$1/category$$value  repeating child element
//! _action_delete=/zoo$1/cage$2           selector bound to a position
//! ```
//!
//! Positions are 1-based and count every child slot, whatever its name.

use std::fmt;

use crate::tree::PLACEHOLDER_NAME;

pub const PATH_SEPARATOR: char = '/';
pub const PAIR_SEPARATOR: char = '$';
pub const MULTI_SEPARATOR: &str = "$$";
pub const SELECTOR_INDICATOR: char = '=';

/// A single step of a field path after the model entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component<'a> {
    /// `name$n`: the child slot at 1-based `position`, holding an element `name`.
    Element { name: &'a str, position: usize },
    /// `name`: an attribute on the current element. Terminal.
    Attribute(&'a str),
    /// `element$$attribute`: one new `element` per value. Terminal.
    Multivalue {
        element: &'a str,
        attribute: &'a str,
    },
}

impl<'a> Component<'a> {
    /// Parse a single path piece, rejecting empty names and positions below 1.
    ///
    /// Elements may not be named [`PLACEHOLDER_NAME`], which stands for a
    /// vacant slot once a document is written out.
    #[must_use]
    pub fn parse(piece: &'a str) -> Option<Self> {
        let parts: Vec<&str> = piece.split(PAIR_SEPARATOR).collect();
        match parts.as_slice() {
            [attribute] if !attribute.is_empty() => Some(Self::Attribute(*attribute)),
            [name, position] if is_element_name(name) => {
                let position = position.parse::<usize>().ok().filter(|p| *p > 0)?;
                Some(Self::Element {
                    name: *name,
                    position,
                })
            }
            [element, "", attribute] if is_element_name(element) && !attribute.is_empty() => {
                Some(Self::Multivalue {
                    element: *element,
                    attribute: *attribute,
                })
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Element { .. })
    }
}

fn is_element_name(name: &str) -> bool {
    !name.is_empty() && name != PLACEHOLDER_NAME
}

impl fmt::Display for Component<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { name, position } => write!(f, "{name}{PAIR_SEPARATOR}{position}"),
            Self::Attribute(attribute) => f.write_str(attribute),
            Self::Multivalue { element, attribute } => {
                write!(f, "{element}{MULTI_SEPARATOR}{attribute}")
            }
        }
    }
}

/// A parsed field name: the model (document) it targets and the steps inside it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath<'a> {
    model: &'a str,
    position: usize,
    components: Vec<Component<'a>>,
}

impl<'a> FieldPath<'a> {
    /// Parse a field name such as `/zoo$1/cage$2/name`.
    ///
    /// Returns `None` for anything that is not a field path: names without a
    /// separator, a first step that is not a `name$n` pair, or any malformed
    /// component. Forms carry unrelated fields, so callers skip these.
    #[must_use]
    pub fn parse(path: &'a str) -> Option<Self> {
        let mut pieces = path.split(PATH_SEPARATOR);
        // Text ahead of the first separator is not part of the path.
        pieces.next()?;

        let Component::Element { name, position } = Component::parse(pieces.next()?)? else {
            return None;
        };

        let components = pieces.map(Component::parse).collect::<Option<Vec<_>>>()?;

        Some(Self {
            model: name,
            position,
            components,
        })
    }

    /// The document name, taken from the first step.
    #[must_use]
    pub fn model(&self) -> &'a str {
        self.model
    }

    /// Position given for the model step. Documents have a single root, so only 1 addresses it.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn components(&self) -> &[Component<'a>] {
        &self.components
    }
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PATH_SEPARATOR}{}{PAIR_SEPARATOR}{}",
            self.model, self.position
        )?;
        for component in &self.components {
            write!(f, "{PATH_SEPARATOR}{component}")?;
        }
        Ok(())
    }
}

/// Split `name=/path` into the selector name and the path after the first indicator.
#[must_use]
pub fn split_selector(field: &str) -> Option<(&str, &str)> {
    field.split_once(SELECTOR_INDICATOR)
}

/// The part of a field name ahead of any multivalue suffix.
#[must_use]
pub fn field_name(name: &str) -> &str {
    name.find(MULTI_SEPARATOR).map_or(name, |end| &name[..end])
}

/// Convert the first of a comma-separated list of field names into a
/// positional reference such as `/*[position() = 1]/*[position() = 2]/name`.
#[must_use]
pub fn element_path(field_names: &str) -> String {
    let first = field_names.split(',').next().unwrap_or_default();

    field_name(first)
        .split(PATH_SEPARATOR)
        .map(|part| {
            let pair: Vec<&str> = part.split(PAIR_SEPARATOR).collect();
            match pair.as_slice() {
                [_, position] => format!("*[position() = {position}]"),
                _ => pair[0].to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
