//! XML encoding and decoding for Omaha documents.
//!
//! Decoding runs in two passes. The first walks the raw event stream and
//! rejects anything that is not a single well-formed element tree
//! ([`DecodeError::Malformed`]). The second maps the tree onto the model
//! types, asserting only the root name and the attributes the protocol
//! requires ([`DecodeError::SchemaMismatch`]). Unknown elements and attributes
//! are skipped.
//!
//! Encoding writes an XML declaration followed by a tab-indented document.
//! Whitespace is cosmetic: compare documents by decoding them, never by bytes.

mod errors;
mod scan;

use quick_xml::se::Serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use self::errors::{DecodeError, EncodeError};

use crate::{PROTOCOL_VERSION, Request, Response};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const REQUEST_ROOT: &str = "request";
const RESPONSE_ROOT: &str = "response";

/// Decodes a client `<request>` document.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] for bytes that are not well-formed XML,
/// [`DecodeError::SchemaMismatch`] when the root is not `<request>` or a
/// required attribute is missing, and [`DecodeError::UnsupportedProtocol`]
/// when the declared protocol is not `3.0`.
pub fn decode_request(bytes: &[u8]) -> Result<Request, DecodeError> {
    let request: Request = decode_document(bytes, REQUEST_ROOT)?;
    if request.protocol != PROTOCOL_VERSION {
        return Err(DecodeError::UnsupportedProtocol {
            found: request.protocol,
        });
    }
    Ok(request)
}

/// Decodes a server `<response>` document.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] or [`DecodeError::SchemaMismatch`] under
/// the same conditions as [`decode_request`].
pub fn decode_response(bytes: &[u8]) -> Result<Response, DecodeError> {
    decode_document(bytes, RESPONSE_ROOT)
}

/// Encodes a client `<request>` document.
///
/// # Errors
///
/// Returns [`EncodeError`] when a field holds a character XML cannot carry.
pub fn encode_request(request: &Request) -> Result<String, EncodeError> {
    encode_document(request, REQUEST_ROOT)
}

/// Encodes a server `<response>` document.
///
/// # Errors
///
/// Returns [`EncodeError`] when a field holds a character XML cannot carry.
pub fn encode_response(response: &Response) -> Result<String, EncodeError> {
    encode_document(response, RESPONSE_ROOT)
}

fn decode_document<T>(bytes: &[u8], expected_root: &str) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    let text = std::str::from_utf8(bytes)
        .map_err(|error| DecodeError::malformed(format!("document is not UTF-8: {error}")))?;

    let root = scan::root_element(text)?;
    if root != expected_root {
        return Err(DecodeError::schema_mismatch(format!(
            "expected root element <{expected_root}>, found <{root}>"
        )));
    }

    quick_xml::de::from_str(text).map_err(|error| DecodeError::schema_mismatch(error.to_string()))
}

fn encode_document<T>(value: &T, root: &str) -> Result<String, EncodeError>
where
    T: Serialize,
{
    let mut body = String::from(XML_DECLARATION);
    let mut serializer = Serializer::with_root(&mut body, Some(root))?;
    serializer.indent('\t', 1);
    value.serialize(serializer)?;

    if let Some(invalid) = body.chars().find(|character| !is_xml_char(*character)) {
        return Err(EncodeError::InvalidCharacter {
            code: u32::from(invalid),
        });
    }
    body.push('\n');
    Ok(body)
}

/// Characters permitted by the XML 1.0 `Char` production.
const fn is_xml_char(character: char) -> bool {
    matches!(
        character,
        '\t' | '\n'
            | '\r'
            | ' '..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
