//! Well-formedness pass run before structural decoding.
//!
//! Serde-driven decoding reports every failure the same way, which would blur
//! the line between a corrupt body and a valid document with the wrong shape.
//! Walking the event stream first lets the codec tell the two apart.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::DecodeError;

/// Checks that `text` is a single well-formed element tree and returns the
/// local name of its root element.
pub(super) fn root_element(text: &str) -> Result<String, DecodeError> {
    let mut reader = Reader::from_str(text);
    let mut depth = 0_usize;
    let mut root = None::<String>;

    loop {
        let event = reader
            .read_event()
            .map_err(|error| DecodeError::malformed(error.to_string()))?;
        match event {
            Event::Start(start) => {
                check_attributes(&start)?;
                if depth == 0 {
                    record_root(&mut root, &start)?;
                }
                depth += 1;
            }
            Event::Empty(start) => {
                check_attributes(&start)?;
                if depth == 0 {
                    record_root(&mut root, &start)?;
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| DecodeError::malformed("closing tag without opening tag"))?;
            }
            Event::Text(content) => {
                content
                    .unescape()
                    .map_err(|error| DecodeError::malformed(error.to_string()))?;
                if depth == 0 && !content.iter().all(u8::is_ascii_whitespace) {
                    return Err(DecodeError::malformed("text outside the root element"));
                }
            }
            Event::CData(_) if depth == 0 => {
                return Err(DecodeError::malformed("character data outside the root element"));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(DecodeError::malformed("document ended inside an open element"));
    }
    root.ok_or_else(|| DecodeError::malformed("document has no root element"))
}

fn record_root(root: &mut Option<String>, start: &BytesStart<'_>) -> Result<(), DecodeError> {
    if root.is_some() {
        return Err(DecodeError::malformed("document has more than one root element"));
    }
    let name = String::from_utf8_lossy(start.local_name().into_inner()).into_owned();
    *root = Some(name);
    Ok(())
}

fn check_attributes(start: &BytesStart<'_>) -> Result<(), DecodeError> {
    for attribute in start.attributes() {
        attribute.map_err(|error| DecodeError::malformed(error.to_string()))?;
    }
    Ok(())
}
