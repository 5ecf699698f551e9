//! Section encodings
//!
//! Most sections are stored as YAML documents. The push-rule cache is stored
//! as JSON. Each section declares its format up front, so nothing here looks
//! at file names.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// On-disk encoding of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable keyed document
    Yaml,
    /// Compact data-interchange document
    Json,
}

/// Encoding or decoding failure
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Format {
    /// File extension conventionally used for this format
    pub fn extension(self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }

    /// Decode a complete value from `bytes`
    ///
    /// A new value is built from scratch; on error nothing is returned, so
    /// callers can never observe a half-populated section.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        let value = match self {
            Format::Yaml => serde_yaml::from_slice(bytes)?,
            Format::Json => serde_json::from_slice(bytes)?,
        };
        Ok(value)
    }

    /// Encode `value` into bytes
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        let bytes = match self {
            Format::Yaml => serde_yaml::to_string(value)?.into_bytes(),
            Format::Json => serde_json::to_vec(value)?,
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
        enabled: bool,
    }

    #[test]
    fn test_yaml_is_keyed_text() {
        let sample = Sample {
            name: "alpha".to_string(),
            count: 3,
            enabled: true,
        };

        let bytes = Format::Yaml.encode(&sample).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("name: alpha"));
        assert!(text.contains("count: 3"));

        let decoded: Sample = Format::Yaml.decode(&bytes).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn test_json_is_compact() {
        let sample = Sample::default();
        let bytes = Format::Json.encode(&sample).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"name":"","count":0,"enabled":false}"#
        );
    }

    #[test]
    fn test_decode_rejects_invalid_input() {
        let err = Format::Yaml.decode::<Sample>(b"name: [unterminated").unwrap_err();
        assert!(matches!(err, CodecError::Yaml(_)));

        let err = Format::Json.decode::<Sample>(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let result = Format::Yaml.decode::<Sample>(b"name: x\ncount: many\nenabled: true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_json_null_is_absent_option() {
        let decoded: Option<Sample> = Format::Json.decode(b"null").unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_extension() {
        assert_eq!(Format::Yaml.extension(), "yaml");
        assert_eq!(Format::Json.extension(), "json");
    }
}
