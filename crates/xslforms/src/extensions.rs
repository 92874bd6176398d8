//! Template functions for rendering field names into generated markup.
//!
//! Stylesheets call these while rendering a document, for example
//! `{template:this-attribute()}` on an `@name` context produces
//! `/zoo$1/cage$2/name`. Instead of registering callbacks with a transform
//! engine globally, the engine resolves a [`TemplateFunction`] by name and
//! calls it with an explicit [`TemplateContext`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::output::path_to_node;
use crate::output::PathReference;
use crate::path::element_path;
use crate::path::PAIR_SEPARATOR;
use crate::path::PATH_SEPARATOR;
use crate::path::SELECTOR_INDICATOR;
use crate::tree::Document;
use crate::tree::NodeRef;

/// Namespace stylesheets bind the template functions to.
pub const TEMPLATE_NAMESPACE: &str = "http://www.boddie.org.uk/ns/xmltools/template";

/// Separates the parts of a `range` spec. Commas already separate template
/// annotation fields, so the parts share a single argument.
const RANGE_SEPARATOR: &str = "...";

/// Everything outside `[A-Za-z0-9_.-]` is escaped, `/` and `#` included.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-');

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("Unknown template function '{0}'")]
    UnknownFunction(String),

    #[error("{function}() takes {expected} arguments, {found} given")]
    Arity {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("{function}() expects {expected} for argument {index}")]
    ArgumentType {
        function: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("Invalid range '{0}', expected start...finish or start...finish...step")]
    Range(String),
}

/// The result of a template function: a string, or a list of strings the
/// engine turns into a node set of text nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateValue {
    Text(String),
    List(Vec<String>),
}

impl TemplateValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(_) => None,
        }
    }
}

impl From<String> for TemplateValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Read-only translation table used by `i18n`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Translations {
    locales: Vec<(String, FxHashMap<String, String>)>,
}

impl Translations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a locale. The first locale added is the fallback for unknown locales.
    #[must_use]
    pub fn with_locale<I, K, V>(mut self, code: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.locales.push((code.to_string(), entries));
        self
    }

    /// Translate `value` for `locale`, falling back to the first locale.
    #[must_use]
    pub fn translate(&self, locale: &str, value: &str) -> Option<&str> {
        fn lookup<'e>(entries: &'e FxHashMap<String, String>, value: &str) -> Option<&'e str> {
            entries.get(value).map(String::as_str)
        }

        self.locales
            .iter()
            .find(|(code, _)| code == locale)
            .and_then(|(_, entries)| lookup(entries, value))
            .or_else(|| {
                self.locales
                    .first()
                    .and_then(|(_, entries)| lookup(entries, value))
            })
    }
}

/// The position a template function is evaluated at.
#[derive(Clone, Copy, Debug)]
pub struct TemplateContext<'a> {
    pub document: &'a Document,
    pub node: &'a NodeRef,
    /// The stylesheet's `this-name` variable, naming the attribute being rendered.
    pub this_name: Option<&'a str>,
    pub translations: Option<&'a Translations>,
    pub locale: Option<&'a str>,
}

impl<'a> TemplateContext<'a> {
    #[must_use]
    pub fn new(document: &'a Document, node: &'a NodeRef) -> Self {
        Self {
            document,
            node,
            this_name: None,
            translations: None,
            locale: None,
        }
    }

    #[must_use]
    pub fn with_this_name(mut self, name: &'a str) -> Self {
        self.this_name = Some(name);
        self
    }

    #[must_use]
    pub fn with_translations(mut self, translations: &'a Translations, locale: &'a str) -> Self {
        self.translations = Some(translations);
        self.locale = Some(locale);
        self
    }
}

/// A template function argument as the transform engine evaluated it.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Nodes of the context document.
    Nodes(Vec<NodeRef>),
}

impl Argument {
    fn truthy(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Number(number) => *number != 0.0 && !number.is_nan(),
            Self::Boolean(value) => *value,
            Self::Nodes(nodes) => !nodes.is_empty(),
        }
    }

    /// String value of the argument; node sets concatenate their attribute values.
    fn string_value(&self, document: &Document) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(number) => Cow::Owned(number.to_string()),
            Self::Boolean(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
            Self::Nodes(nodes) => Cow::Owned(
                nodes
                    .iter()
                    .map(|node| node_value(document, node))
                    .collect(),
            ),
        }
    }
}

/// Attribute nodes carry a value; elements hold no text in form documents.
fn node_value<'d>(document: &'d Document, node: &NodeRef) -> &'d str {
    match node {
        NodeRef::Attribute { owner, name } => document.attribute(*owner, name).unwrap_or_default(),
        NodeRef::Element(_) => "",
    }
}

/// Join `items`, keeping only the first occurrence of each.
fn join_distinct(items: impl IntoIterator<Item = String>) -> String {
    let mut seen = FxHashSet::default();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect::<Vec<_>>()
        .join(",")
}

#[must_use]
pub fn this_element(context: &TemplateContext<'_>) -> String {
    path_to_node(context.document, context.node, PathReference::Element)
}

#[must_use]
pub fn this_attribute(context: &TemplateContext<'_>) -> String {
    path_to_node(
        context.document,
        context.node,
        PathReference::Attribute(context.this_name),
    )
}

#[must_use]
pub fn new_attribute(context: &TemplateContext<'_>, name: &str) -> String {
    format!("{}{PATH_SEPARATOR}{name}", this_element(context))
}

#[must_use]
pub fn other_elements(document: &Document, nodes: &[NodeRef]) -> String {
    join_distinct(
        nodes
            .iter()
            .map(|node| path_to_node(document, node, PathReference::Element)),
    )
}

#[must_use]
pub fn list_attribute(context: &TemplateContext<'_>, element: &str, attribute: &str) -> String {
    path_to_node(
        context.document,
        context.node,
        PathReference::ListAttribute { element, attribute },
    )
}

#[must_use]
pub fn other_list_attributes(
    document: &Document,
    element: &str,
    attribute: &str,
    nodes: &[NodeRef],
) -> String {
    join_distinct(nodes.iter().map(|node| {
        path_to_node(
            document,
            node,
            PathReference::ListAttribute { element, attribute },
        )
    }))
}

#[must_use]
pub fn other_attributes(document: &Document, attribute: &str, nodes: &[NodeRef]) -> String {
    join_distinct(
        nodes
            .iter()
            .map(|node| path_to_node(document, node, PathReference::Attribute(Some(attribute)))),
    )
}

/// `child-element('comment', 1, '/a$1,/b$1')` gives `/a$1/comment$1,/b$1/comment$1`.
#[must_use]
pub fn child_element(element: &str, position: usize, node_paths: &str) -> String {
    node_paths
        .split(',')
        .map(|path| format!("{path}{PATH_SEPARATOR}{element}{PAIR_SEPARATOR}{position}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[must_use]
pub fn child_attribute(attribute: &str, node_paths: &str) -> String {
    node_paths
        .split(',')
        .map(|path| format!("{path}{PATH_SEPARATOR}{attribute}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// `selector-name('add-platform', nodes)` gives `add-platform=/package$1/platforms$1`.
#[must_use]
pub fn selector_name(field_name: &str, document: &Document, nodes: &[NodeRef]) -> String {
    join_distinct(nodes.iter().map(|node| {
        format!(
            "{field_name}{SELECTOR_INDICATOR}{}",
            path_to_node(document, node, PathReference::Element)
        )
    }))
}

#[must_use]
pub fn multi_field_name(context: &TemplateContext<'_>, name: &str) -> String {
    path_to_node(
        context.document,
        context.node,
        PathReference::MultiAttribute(name),
    )
}

#[must_use]
pub fn other_multi_field_names(document: &Document, name: &str, nodes: &[NodeRef]) -> String {
    join_distinct(
        nodes
            .iter()
            .map(|node| path_to_node(document, node, PathReference::MultiAttribute(name))),
    )
}

#[must_use]
pub fn choice<'s>(value: bool, true_string: &'s str, false_string: Option<&'s str>) -> &'s str {
    if value {
        true_string
    } else {
        false_string.unwrap_or_default()
    }
}

#[must_use]
pub fn url_encode(text: &str) -> String {
    utf8_percent_encode(text, URL_COMPONENT).to_string()
}

/// Numbers from `start` up to but not including `finish`, from a
/// `start...finish...step` spec. The step defaults to 1 and may be negative.
pub fn range(spec: &str) -> Result<Vec<String>, ExtensionError> {
    let invalid = || ExtensionError::Range(spec.to_string());
    let number = |part: &str| part.trim().parse::<i64>().map_err(|_| invalid());

    let parts: Vec<&str> = spec.split(RANGE_SEPARATOR).collect();
    let (start, finish, step) = match parts.as_slice() {
        [start, finish] => (number(*start)?, number(*finish)?, 1),
        [start, finish, step, ..] => (number(*start)?, number(*finish)?, number(*step)?),
        _ => return Err(invalid()),
    };
    if step == 0 {
        return Err(invalid());
    }

    let mut values = Vec::new();
    let mut current = start;
    while (step > 0 && current < finish) || (step < 0 && current > finish) {
        values.push(current.to_string());
        let Some(next) = current.checked_add(step) else {
            break;
        };
        current = next;
    }
    Ok(values)
}

/// Translate `value` when a translation table and locale are in scope.
#[must_use]
pub fn i18n(context: &TemplateContext<'_>, value: &str) -> String {
    match (context.translations, context.locale) {
        (Some(translations), Some(locale)) => translations
            .translate(locale, value)
            .unwrap_or(value)
            .to_string(),
        _ => value.to_string(),
    }
}

/// The functions a stylesheet can call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateFunction {
    ThisElement,
    ThisAttribute,
    NewAttribute,
    OtherElements,
    ListAttribute,
    OtherListAttributes,
    OtherAttributes,
    ChildElement,
    ChildAttribute,
    SelectorName,
    MultiFieldName,
    OtherMultiFieldNames,
    ElementPath,
    Choice,
    UrlEncode,
    I18n,
    Range,
}

impl TemplateFunction {
    pub const ALL: [Self; 17] = [
        Self::ThisElement,
        Self::ThisAttribute,
        Self::NewAttribute,
        Self::OtherElements,
        Self::ListAttribute,
        Self::OtherListAttributes,
        Self::OtherAttributes,
        Self::ChildElement,
        Self::ChildAttribute,
        Self::SelectorName,
        Self::MultiFieldName,
        Self::OtherMultiFieldNames,
        Self::ElementPath,
        Self::Choice,
        Self::UrlEncode,
        Self::I18n,
        Self::Range,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ThisElement => "this-element",
            Self::ThisAttribute => "this-attribute",
            Self::NewAttribute => "new-attribute",
            Self::OtherElements => "other-elements",
            Self::ListAttribute => "list-attribute",
            Self::OtherListAttributes => "other-list-attributes",
            Self::OtherAttributes => "other-attributes",
            Self::ChildElement => "child-element",
            Self::ChildAttribute => "child-attribute",
            Self::SelectorName => "selector-name",
            Self::MultiFieldName => "multi-field-name",
            Self::OtherMultiFieldNames => "other-multi-field-names",
            Self::ElementPath => "element-path",
            Self::Choice => "choice",
            Self::UrlEncode => "url-encode",
            Self::I18n => "i18n",
            Self::Range => "range",
        }
    }

    /// Look up a function by its template name, including the older names
    /// stylesheets still use.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "this-position" => Some(Self::ThisElement),
            "field-name" => Some(Self::ThisAttribute),
            "new-field" => Some(Self::NewAttribute),
            "other-field-names" => Some(Self::OtherElements),
            _ => Self::ALL
                .into_iter()
                .find(|function| function.name() == name),
        }
    }

    /// Accepted argument counts, inclusive.
    fn arity(self) -> (usize, usize, &'static str) {
        match self {
            Self::ThisElement | Self::ThisAttribute => (0, 0, "0"),
            Self::NewAttribute
            | Self::OtherElements
            | Self::MultiFieldName
            | Self::ElementPath
            | Self::UrlEncode
            | Self::I18n
            | Self::Range => (1, 1, "1"),
            Self::ListAttribute
            | Self::OtherAttributes
            | Self::ChildAttribute
            | Self::SelectorName
            | Self::OtherMultiFieldNames => (2, 2, "2"),
            Self::OtherListAttributes | Self::ChildElement => (3, 3, "3"),
            Self::Choice => (2, 3, "2 or 3"),
        }
    }

    pub fn call(
        self,
        context: &TemplateContext<'_>,
        args: &[Argument],
    ) -> Result<TemplateValue, ExtensionError> {
        let (min, max, expected) = self.arity();
        if args.len() < min || args.len() > max {
            return Err(ExtensionError::Arity {
                function: self.name(),
                expected,
                found: args.len(),
            });
        }

        let document = context.document;
        let args = Args {
            function: self.name(),
            document,
            args,
        };

        let result = match self {
            Self::ThisElement => this_element(context),
            Self::ThisAttribute => this_attribute(context),
            Self::NewAttribute => new_attribute(context, &args.text(0)),
            Self::OtherElements => other_elements(document, args.nodes(0)?),
            Self::ListAttribute => list_attribute(context, &args.text(0), &args.text(1)),
            Self::OtherListAttributes => {
                other_list_attributes(document, &args.text(0), &args.text(1), args.nodes(2)?)
            }
            Self::OtherAttributes => other_attributes(document, &args.text(0), args.nodes(1)?),
            Self::ChildElement => child_element(&args.text(0), args.position(1)?, &args.text(2)),
            Self::ChildAttribute => child_attribute(&args.text(0), &args.text(1)),
            Self::SelectorName => selector_name(&args.text(0), document, args.nodes(1)?),
            Self::MultiFieldName => multi_field_name(context, &args.text(0)),
            Self::OtherMultiFieldNames => {
                other_multi_field_names(document, &args.text(0), args.nodes(1)?)
            }
            Self::ElementPath => element_path(&args.text(0)),
            Self::Choice => {
                let false_string = (args.args.len() > 2).then(|| args.text(2));
                choice(
                    args.args[0].truthy(),
                    &args.text(1),
                    false_string.as_deref(),
                )
                .to_string()
            }
            Self::UrlEncode => url_encode(&args.text(0)),
            Self::I18n => i18n(context, &args.text(0)),
            Self::Range => return range(&args.text(0)).map(TemplateValue::List),
        };
        Ok(TemplateValue::Text(result))
    }
}

impl FromStr for TemplateFunction {
    type Err = ExtensionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::from_name(name).ok_or_else(|| ExtensionError::UnknownFunction(name.to_string()))
    }
}

impl fmt::Display for TemplateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Positional argument access for one call.
struct Args<'a> {
    function: &'static str,
    document: &'a Document,
    args: &'a [Argument],
}

impl<'a> Args<'a> {
    fn text(&self, index: usize) -> Cow<'a, str> {
        let args: &'a [Argument] = self.args;
        args[index].string_value(self.document)
    }

    fn nodes(&self, index: usize) -> Result<&'a [NodeRef], ExtensionError> {
        let args: &'a [Argument] = self.args;
        match &args[index] {
            Argument::Nodes(nodes) => Ok(nodes),
            _ => Err(self.type_error(index, "a node set")),
        }
    }

    fn position(&self, index: usize) -> Result<usize, ExtensionError> {
        let position = match &self.args[index] {
            Argument::Number(number) if number.is_finite() && *number >= 0.0 => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let position = number.trunc() as usize;
                Some(position)
            }
            Argument::Text(text) => text.trim().parse().ok(),
            _ => None,
        };
        position.ok_or_else(|| self.type_error(index, "a position"))
    }

    fn type_error(&self, index: usize, expected: &'static str) -> ExtensionError {
        ExtensionError::ArgumentType {
            function: self.function,
            index: index + 1,
            expected,
        }
    }
}
