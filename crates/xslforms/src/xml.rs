//! XML text for documents.
//!
//! Vacant slots are written as `<placeholder/>` elements so that positions
//! survive a trip through a stylesheet, and are read back as vacant slots.

use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use quick_xml::Writer;

use crate::error::XmlError;
use crate::tree::Document;
use crate::tree::NodeId;
use crate::tree::Slot;
use crate::tree::PLACEHOLDER_NAME;

/// Serialize `document` without an XML declaration. Attributes are written
/// in name order, so equal documents give identical text.
///
/// A real element named [`PLACEHOLDER_NAME`] would read back as a vacant
/// slot, so it is an error.
pub fn to_xml(document: &Document) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, document, document.root())?;
    String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Utf8(err.utf8_error()))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    document: &Document,
    id: NodeId,
) -> Result<(), XmlError> {
    let element = document.element(id);
    if element.name() == PLACEHOLDER_NAME {
        return Err(XmlError::PlaceholderElement);
    }

    let mut start = BytesStart::new(element.name());
    for (name, value) in element.attributes() {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for slot in element.children() {
        match slot {
            Slot::Vacant => writer.write_event(Event::Empty(BytesStart::new(PLACEHOLDER_NAME)))?,
            Slot::Element(child) => write_element(writer, document, *child)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
    Ok(())
}

/// Read the element structure of `text`.
///
/// Text, comments and processing instructions are dropped, since documents
/// built from fields only carry attributes. Anything inside a placeholder is
/// ignored along with it.
pub fn from_xml(text: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut document: Option<Document> = None;
    // Open elements; `None` marks an open placeholder.
    let mut open: Vec<Option<NodeId>> = Vec::new();

    loop {
        let (start, is_empty) = match reader.read_event()? {
            Event::Start(start) => (start, false),
            Event::Empty(start) => (start, true),
            Event::End(_) => {
                open.pop();
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let node = match open.last().copied() {
            None if document.is_some() => return Err(XmlError::MultipleRoots(name)),
            None if name == PLACEHOLDER_NAME => return Err(XmlError::PlaceholderRoot),
            None => {
                let created = Document::new(&name);
                let root = created.root();
                document = Some(created);
                Some(root)
            }
            Some(None) => None,
            Some(Some(parent)) => {
                let Some(document) = document.as_mut() else {
                    return Err(XmlError::NoRootElement);
                };
                if name == PLACEHOLDER_NAME {
                    document.append_vacant(parent);
                    None
                } else {
                    Some(document.append_element(parent, &name))
                }
            }
        };

        if let (Some(id), Some(document)) = (node, document.as_mut()) {
            for attribute in start.attributes() {
                let attribute = attribute?;
                let key = std::str::from_utf8(attribute.key.as_ref())?;
                let value = attribute.unescape_value()?;
                document.set_attribute(id, key, value.into_owned());
            }
        }

        if !is_empty {
            open.push(node);
        }
    }

    document.ok_or(XmlError::NoRootElement)
}
