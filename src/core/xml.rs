use crate::core::{Document, Leaf};
use crate::utils::error::{BridgeError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

const ROOT_ELEMENT: &str = "data";

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(|e| BridgeError::XmlError {
        message: e.to_string(),
    })
}

fn write_leaf(writer: &mut Writer<Cursor<Vec<u8>>>, leaf: &Leaf) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(leaf.name.as_str())))?;
    emit(writer, Event::Text(BytesText::new(&leaf.text)))?;
    emit(writer, Event::End(BytesEnd::new(leaf.name.as_str())))
}

/// Serialize a submission as UTF-8 XML, elements in construction order.
pub fn to_xml_bytes(document: &Document) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("id", document.id.as_str()));
    for (name, uri) in &document.namespaces {
        root.push_attribute((name.as_str(), uri.as_str()));
    }
    emit(&mut writer, Event::Start(root))?;

    for leaf in &document.top_level {
        write_leaf(&mut writer, leaf)?;
    }

    for group in &document.groups {
        emit(&mut writer, Event::Start(BytesStart::new(group.name.as_str())))?;
        for leaf in &group.leaves {
            write_leaf(&mut writer, leaf)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new(group.name.as_str())))?;
    }

    emit(&mut writer, Event::Start(BytesStart::new("meta")))?;
    write_leaf(
        &mut writer,
        &Leaf {
            name: "instanceID".to_string(),
            text: document.instance_id.clone(),
        },
    )?;
    emit(&mut writer, Event::End(BytesEnd::new("meta")))?;

    emit(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    Ok(writer.into_inner().into_inner())
}
