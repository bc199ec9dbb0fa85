use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::MappingError;
use crate::model::row::MappingElement;

const MAP_TAG: &[u8] = b"map";

/// Parses the ajax answer of the build server:
///
/// ```text
/// <response>
///   <mapping>
///     <map from="." to="perforce://rusps-app01:1666:////depot/src" comment="mock"/>
///   </mapping>
/// </response>
/// ```
///
/// Every `map` element is collected in document order, wherever it sits.
/// A body without any element yields no mappings.
pub fn parse(text: &str) -> Result<Vec<MappingElement>, MappingError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == MAP_TAG => {
                out.push(map_element(&reader, &e)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

fn map_element(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<MappingElement, MappingError> {
    let mut element = MappingElement::default();

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.decode_and_unescape_value(reader.decoder())?;
        match attr.key.as_ref() {
            b"from" => element.from = value.into_owned(),
            b"to" => element.to = value.into_owned(),
            b"comment" => element.comment = value.into_owned(),
            _ => {}
        }
    }

    Ok(element)
}
