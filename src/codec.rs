//! Byte-level decoding of JSON and YAML documents.
//!
//! YAML is first read into a [`serde_json::Value`] and then converted into the
//! target type. Going through the JSON value model normalises YAML-only
//! features (integer map keys such as `200:`, anchors, tags) before the typed
//! decode sees them.

use crate::error::FormatError;
use crate::location::Location;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Textual encodings understood by [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Picks the format from the extension of `origin`, if it has a known one.
    pub fn from_location(origin: &Location) -> Option<Self> {
        let path = origin.path().to_ascii_lowercase();
        if path.ends_with(".json") {
            Some(Format::Json)
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(Format::Yaml)
        } else {
            None
        }
    }

    /// JSON when the first non-whitespace character opens an object or array.
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{') | Some('[') => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Decodes `bytes` into `T`. The format comes from the extension of
/// `origin`, falling back to content sniffing.
pub fn parse<T: DeserializeOwned>(bytes: &[u8], origin: Option<&Location>) -> Result<T, FormatError> {
    let text = std::str::from_utf8(bytes)?;
    let format = origin
        .and_then(Format::from_location)
        .unwrap_or_else(|| Format::sniff(text));
    parse_str(text, format)
}

pub fn parse_str<T: DeserializeOwned>(text: &str, format: Format) -> Result<T, FormatError> {
    match format {
        Format::Json => Ok(serde_json::from_str(text)?),
        Format::Yaml => {
            let value: Value = serde_yaml::from_str(text)?;
            Ok(serde_json::from_value(value)?)
        }
    }
}
