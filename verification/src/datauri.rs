//! Decoding of data-URI image payloads from offline clients.
//!
//! Offline submissions embed their photos as `data:image/<fmt>;base64,<data>`
//! strings. Decoding is strict; the *caller* decides whether a failure is
//! fatal (the reconciler tolerates it per slot).

use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("not a data URI")]
    NotDataUri,

    #[error("not an image payload: {0}")]
    NotAnImage(String),

    #[error("missing base64 marker")]
    MissingBase64Marker,

    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decode an embedded image, returning its media type and raw bytes.
pub fn decode_image(uri: &str) -> Result<(String, Vec<u8>), DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::NotDataUri)?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or(DataUriError::MissingBase64Marker)?;
    if !mime.starts_with("image/") {
        return Err(DataUriError::NotAnImage(mime.to_string()));
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_valid_jpeg_uri() {
        // "hello" in base64.
        let (mime, bytes) = decode_image("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn rejects_non_data_uris() {
        assert!(matches!(
            decode_image("https://example.com/a.jpg"),
            Err(DataUriError::NotDataUri)
        ));
    }

    #[test]
    fn rejects_non_image_payloads() {
        assert!(matches!(
            decode_image("data:text/plain;base64,aGVsbG8="),
            Err(DataUriError::NotAnImage(_))
        ));
    }

    #[test]
    fn rejects_missing_marker_and_bad_base64() {
        assert!(matches!(
            decode_image("data:image/png,rawbytes"),
            Err(DataUriError::MissingBase64Marker)
        ));
        assert!(matches!(
            decode_image("data:image/png;base64,!!!not-base64!!!"),
            Err(DataUriError::Base64(_))
        ));
    }
}
