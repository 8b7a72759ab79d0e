//! Request body descriptors.
//!
//! # Design
//! A body is either deliberately empty (present on the wire with a zero
//! length, so transports emit `Content-Length: 0`) or an in-memory payload
//! with a media type. Large or open-ended payloads do not travel through the
//! single-shot path at all — they go through a media uploader, which owns its
//! own chunking.

use serde::Serialize;

use crate::error::Error;

/// Media type used by [`Content::json`].
pub const JSON: &str = "application/json";

/// A request body, present on the wire even when zero-length.
///
/// A request with no body at all is represented as `Option<Content>::None`
/// on the descriptor, not as a `Content` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Zero-length body. Forces a `Content-Length: 0` header, which some
    /// servers require on bodyless POST requests.
    Empty,
    /// In-memory payload with a known media type.
    Bytes { media_type: String, data: Vec<u8> },
}

impl Content {
    /// Serializes `value` as a JSON payload.
    pub fn json<S: Serialize>(value: &S) -> Result<Self, Error> {
        let data =
            serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Content::Bytes {
            media_type: JSON.to_string(),
            data,
        })
    }

    pub fn bytes(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Content::Bytes {
            media_type: media_type.into(),
            data,
        }
    }

    /// Media type of the payload, or `None` for the empty marker.
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Content::Empty => None,
            Content::Bytes { media_type, .. } => Some(media_type),
        }
    }

    /// Body length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            Content::Empty => 0,
            Content::Bytes { data, .. } => data.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw body bytes; empty slice for the empty marker.
    pub fn data(&self) -> &[u8] {
        match self {
            Content::Empty => &[],
            Content::Bytes { data, .. } => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_has_zero_length_and_no_media_type() {
        let content = Content::Empty;
        assert_eq!(content.len(), 0);
        assert!(content.is_empty());
        assert!(content.media_type().is_none());
        assert!(content.data().is_empty());
    }

    #[test]
    fn json_content_serializes_value() {
        let content = Content::json(&serde_json::json!({"name": "disk"})).unwrap();
        assert_eq!(content.media_type(), Some(JSON));
        let parsed: serde_json::Value = serde_json::from_slice(content.data()).unwrap();
        assert_eq!(parsed["name"], "disk");
    }

    #[test]
    fn bytes_content_reports_length() {
        let content = Content::bytes("application/octet-stream", vec![1, 2, 3]);
        assert_eq!(content.len(), 3);
        assert!(!content.is_empty());
        assert_eq!(content.data(), &[1, 2, 3]);
    }
}
