//! Error types for the XML codec.

use quick_xml::se::SeError;
use thiserror::Error;

/// Errors raised while decoding an Omaha document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a well-formed XML document.
    #[error("malformed XML: {message}")]
    Malformed {
        /// Description of the first problem found.
        message: String,
    },

    /// The document is well formed but lacks structure the protocol requires.
    #[error("document does not match the Omaha schema: {message}")]
    SchemaMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// The document declares a protocol revision the server does not speak.
    #[error("unsupported protocol version '{found}'")]
    UnsupportedProtocol {
        /// Revision declared by the client.
        found: String,
    },
}

impl DecodeError {
    /// Creates a malformed document error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }
}

/// Errors raised while encoding an Omaha document.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A string holds a character XML 1.0 cannot represent.
    #[error("character U+{code:04X} cannot be represented in XML")]
    InvalidCharacter {
        /// Code point of the offending character.
        code: u32,
    },

    /// The serializer rejected the document.
    #[error("failed to serialize XML: {0}")]
    Serialize(#[from] SeError),
}
