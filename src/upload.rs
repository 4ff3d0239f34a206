//! Decoding of browser upload contents.
//!
//! File inputs hand the file over as a `data:` URL, e.g.
//! `data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,UEsDB...`.
//! A bare base64 string is accepted as well.

use crate::errors::AppError;
use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Decoded upload bytes plus what the client declared about them.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

fn data_url_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^data:(?P<mime>[^;,]*)(?P<params>(;[^;,]*)*)$").expect("valid data URL regex")
    })
}

impl Upload {
    /// SHA-256 of the decoded bytes, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decodes `contents` and enforces the upload size limit.
pub fn decode_contents(
    contents: &str,
    filename: Option<&str>,
    max_bytes: usize,
) -> Result<Upload, AppError> {
    let contents = contents.trim();
    if contents.is_empty() {
        return Err(AppError::BadRequest("Upload contents are empty".to_string()));
    }

    let (content_type, payload) = match contents.split_once(',') {
        Some((header, payload)) => {
            let captures = data_url_header().captures(header).ok_or_else(|| {
                AppError::BadRequest("Upload must be a data URL or base64 text".to_string())
            })?;
            let params = captures.name("params").map_or("", |m| m.as_str());
            if !params.split(';').any(|param| param == "base64") {
                return Err(AppError::BadRequest(
                    "Only base64 encoded data URLs are supported".to_string(),
                ));
            }
            let mime = captures
                .name("mime")
                .map(|m| m.as_str().to_string())
                .filter(|m| !m.is_empty());
            (mime, payload)
        }
        None => (None, contents),
    };

    // Base64 text cannot be smaller than three quarters of its length.
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(AppError::BadRequest(format!(
            "Upload exceeds the {} byte limit",
            max_bytes
        )));
    }

    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned.as_bytes())?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "Upload exceeds the {} byte limit",
            max_bytes
        )));
    }

    tracing::debug!(
        "Decoded upload: {} bytes, content type {:?}",
        bytes.len(),
        content_type
    );

    Ok(Upload {
        bytes,
        content_type,
        filename: filename.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    #[test]
    fn decodes_data_url() {
        let encoded = STANDARD.encode(b"Record ID,Email\n1,a@b.co\n");
        let contents = format!("data:text/csv;base64,{}", encoded);
        let upload = decode_contents(&contents, Some("leads.csv"), LIMIT).unwrap();
        assert_eq!(upload.content_type.as_deref(), Some("text/csv"));
        assert_eq!(upload.filename.as_deref(), Some("leads.csv"));
        assert!(upload.bytes.starts_with(b"Record ID"));
    }

    #[test]
    fn decodes_bare_base64() {
        let upload = decode_contents(&STANDARD.encode(b"abc"), None, LIMIT).unwrap();
        assert_eq!(upload.bytes, b"abc");
        assert!(upload.content_type.is_none());
    }

    #[test]
    fn rejects_non_base64_data_url() {
        let err = decode_contents("data:text/csv,Record%20ID", None, LIMIT).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_contents("not base64 at all!", None, LIMIT).is_err());
        assert!(decode_contents("   ", None, LIMIT).is_err());
    }

    #[test]
    fn enforces_size_limit() {
        let encoded = STANDARD.encode(vec![7u8; 64]);
        assert!(decode_contents(&encoded, None, 32).is_err());
        assert!(decode_contents(&encoded, None, 64).is_ok());
    }

    #[test]
    fn fingerprint_is_stable_sha256() {
        let upload = decode_contents(&STANDARD.encode(b"abc"), None, LIMIT).unwrap();
        assert_eq!(
            upload.fingerprint(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
