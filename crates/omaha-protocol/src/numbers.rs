//! Lenient decoding for numeric attributes.
//!
//! Clients pad numbers with whitespace and send empty attributes where they
//! have nothing to report. Both decode: the value is trimmed and an empty
//! attribute falls back to the field default.

use std::num::ParseIntError;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

fn parse_trimmed(raw: &str) -> Result<Option<i32>, ParseIntError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Decodes an integer attribute, mapping an empty value to `T::default()`.
pub(crate) fn int_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<i32> + Default,
{
    let raw = String::deserialize(deserializer)?;
    parse_trimmed(&raw)
        .map(|parsed| parsed.map_or_else(T::default, T::from))
        .map_err(|error| D::Error::custom(format!("invalid integer {raw:?}: {error}")))
}

/// Decodes an optional integer attribute; an empty value reads as absent.
pub(crate) fn optional_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_trimmed(&raw)
        .map_err(|error| D::Error::custom(format!("invalid integer {raw:?}: {error}")))
}
