use std::borrow::Cow;

use bytes::Bytes;
use tracing::warn;

use crate::error::{BlobError, BlobResult};

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// How a request body is stored, decided from its declared content type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// `application/json`, validated and compacted.
    Json,
    /// Any `text/*` type, stored as `text/plain`. The only chunkable kind.
    Text,
    /// Everything else, stored byte for byte.
    Binary,
}

impl PayloadKind {
    /// Classify a declared content type. The JSON match is exact: a type with
    /// parameters such as `application/json; charset=utf-8` is binary.
    pub fn classify(declared: Option<&str>) -> Self {
        match declared {
            Some(APPLICATION_JSON) => Self::Json,
            Some(ct) if ct.starts_with("text/") => Self::Text,
            _ => Self::Binary,
        }
    }
}

/// A request body after content-type processing, ready for storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBody {
    pub kind: PayloadKind,
    pub value: Bytes,
    pub content_type: String,
}

impl EncodedBody {
    /// The value as text, for `Text` payloads.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            PayloadKind::Text => std::str::from_utf8(&self.value).ok(),
            _ => None,
        }
    }
}

/// Turn a raw body into its stored form.
///
/// JSON is parsed and re-serialized compactly; invalid JSON is an error.
/// Text is decoded as UTF-8, with invalid sequences replaced by U+FFFD.
/// Binary is untouched and keeps its declared type, or
/// `application/octet-stream` when none (or an empty one) was given.
pub fn encode_body(body: Bytes, declared: Option<&str>) -> BlobResult<EncodedBody> {
    let kind = PayloadKind::classify(declared);
    match kind {
        PayloadKind::Json => {
            let parsed: serde_json::Value =
                serde_json::from_slice(&body).map_err(BlobError::InvalidJson)?;
            let compact = serde_json::to_vec(&parsed).map_err(BlobError::InvalidJson)?;
            Ok(EncodedBody {
                kind,
                value: Bytes::from(compact),
                content_type: APPLICATION_JSON.to_string(),
            })
        }
        PayloadKind::Text => {
            let value = match String::from_utf8_lossy(&body) {
                Cow::Borrowed(_) => body,
                Cow::Owned(repaired) => {
                    warn!("text body is not valid UTF-8, storing with replacement characters");
                    Bytes::from(repaired)
                }
            };
            Ok(EncodedBody {
                kind,
                value,
                content_type: TEXT_PLAIN.to_string(),
            })
        }
        PayloadKind::Binary => Ok(EncodedBody {
            kind,
            value: body,
            content_type: declared
                .filter(|ct| !ct.is_empty())
                .unwrap_or(OCTET_STREAM)
                .to_string(),
        }),
    }
}

/// Pretty-print a stored JSON value with two-space indentation.
///
/// A stored value that no longer parses is returned unchanged; a formatting
/// defect never fails a read.
pub fn pretty_json(stored: Bytes) -> Bytes {
    let parsed = serde_json::from_slice::<serde_json::Value>(&stored)
        .and_then(|value| serde_json::to_vec_pretty(&value));
    match parsed {
        Ok(pretty) => Bytes::from(pretty),
        Err(err) => {
            warn!(error = %err, "stored JSON does not parse, returning raw value");
            stored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_types() {
        assert_eq!(PayloadKind::classify(Some("application/json")), PayloadKind::Json);
        assert_eq!(PayloadKind::classify(Some("text/plain")), PayloadKind::Text);
        assert_eq!(PayloadKind::classify(Some("text/html")), PayloadKind::Text);
        assert_eq!(PayloadKind::classify(Some("image/png")), PayloadKind::Binary);
        assert_eq!(
            PayloadKind::classify(Some("application/json; charset=utf-8")),
            PayloadKind::Binary
        );
        assert_eq!(PayloadKind::classify(None), PayloadKind::Binary);
    }

    #[test]
    fn json_is_compacted() {
        let body = Bytes::from_static(b"{ \"a\" : [1, 2,  3] }");
        let encoded = encode_body(body, Some(APPLICATION_JSON)).unwrap();
        assert_eq!(&encoded.value[..], br#"{"a":[1,2,3]}"#);
        assert_eq!(encoded.content_type, APPLICATION_JSON);
    }

    #[test]
    fn invalid_json_fails() {
        let err = encode_body(Bytes::from_static(b"{nope"), Some(APPLICATION_JSON)).unwrap_err();
        assert!(matches!(err, BlobError::InvalidJson(_)));
    }

    #[test]
    fn any_text_type_stored_as_plain() {
        let encoded = encode_body(Bytes::from_static(b"<p>hi</p>"), Some("text/html")).unwrap();
        assert_eq!(encoded.content_type, TEXT_PLAIN);
        assert_eq!(encoded.as_text(), Some("<p>hi</p>"));
    }

    #[test]
    fn non_utf8_text_is_repaired() {
        let encoded =
            encode_body(Bytes::from_static(&[b'h', 0xff, b'i']), Some("text/plain")).unwrap();
        assert_eq!(encoded.content_type, TEXT_PLAIN);
        assert_eq!(encoded.as_text(), Some("h\u{FFFD}i"));
    }

    #[test]
    fn json_keeps_key_order() {
        let body = Bytes::from_static(br#"{ "b": 1, "a": {"z": true, "y": null} }"#);
        let encoded = encode_body(body, Some(APPLICATION_JSON)).unwrap();
        assert_eq!(&encoded.value[..], br#"{"b":1,"a":{"z":true,"y":null}}"#);

        let pretty = pretty_json(encoded.value);
        assert_eq!(
            std::str::from_utf8(&pretty).unwrap(),
            "{\n  \"b\": 1,\n  \"a\": {\n    \"z\": true,\n    \"y\": null\n  }\n}"
        );
    }

    #[test]
    fn empty_declared_type_is_octet_stream() {
        let encoded = encode_body(Bytes::from_static(b"x"), Some("")).unwrap();
        assert_eq!(encoded.kind, PayloadKind::Binary);
        assert_eq!(encoded.content_type, OCTET_STREAM);
    }

    #[test]
    fn binary_keeps_declared_type_or_defaults() {
        let png = encode_body(Bytes::from_static(&[0x89, b'P']), Some("image/png")).unwrap();
        assert_eq!(png.content_type, "image/png");
        assert_eq!(png.as_text(), None);

        let raw = encode_body(Bytes::from_static(&[1, 2]), None).unwrap();
        assert_eq!(raw.content_type, OCTET_STREAM);
        assert_eq!(&raw.value[..], &[1, 2]);
    }

    #[test]
    fn pretty_json_indents_two_spaces() {
        let pretty = pretty_json(Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(&pretty[..], b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn pretty_json_falls_back_to_raw() {
        let raw = Bytes::from_static(b"{broken");
        assert_eq!(pretty_json(raw.clone()), raw);
    }
}
