use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{InsightError, Result};

/// A self-describing document: declared media type plus base64-encoded content.
///
/// The content is never decoded by this crate; it is handed to the model's
/// document-ingestion capability as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub mime_type: String,
    pub data: String,
}

impl DocumentPayload {
    /// Parses `data:<mimetype>;base64,<encoded_data>`.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri.trim().strip_prefix("data:").ok_or_else(|| {
            InsightError::InvalidDocument("Data URI must start with 'data:'".to_string())
        })?;

        let (header, data) = rest.split_once(',').ok_or_else(|| {
            InsightError::InvalidDocument("Data URI is missing the ',' separator".to_string())
        })?;

        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            InsightError::InvalidDocument("Data URI must use base64 encoding".to_string())
        })?;

        if mime_type.is_empty() || !mime_type.contains('/') {
            return Err(InsightError::InvalidDocument(format!(
                "Data URI has no valid MIME type: '{}'",
                mime_type
            )));
        }

        if data.is_empty() {
            return Err(InsightError::InvalidDocument(
                "Data URI carries no content".to_string(),
            ));
        }

        STANDARD
            .decode(data)
            .map_err(|e| InsightError::InvalidDocument(format!("Invalid base64 content: {}", e)))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(InsightError::InvalidDocument("Document is empty".to_string()));
        }
        Ok(Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        })
    }

    /// Reads a file and guesses its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, mime_type)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_parsing() {
        let doc = DocumentPayload::from_data_uri("data:text/plain;base64,UmV2ZW51ZSB1cCAxMCU=")
            .unwrap();
        assert_eq!(doc.mime_type, "text/plain");
        assert_eq!(doc.data, "UmV2ZW51ZSB1cCAxMCU=");
        assert_eq!(
            doc.to_data_uri(),
            "data:text/plain;base64,UmV2ZW51ZSB1cCAxMCU="
        );
    }

    #[test]
    fn test_rejects_malformed_data_uris() {
        for uri in [
            "text/plain;base64,AAAA",
            "data:text/plain,AAAA",
            "data:;base64,AAAA",
            "data:application/pdf;base64",
            "data:application/pdf;base64,",
            "data:application/pdf;base64,@@@",
        ] {
            let err = DocumentPayload::from_data_uri(uri).unwrap_err();
            assert!(
                matches!(err, InsightError::InvalidDocument(_)),
                "{} should be rejected",
                uri
            );
        }
    }

    #[test]
    fn test_from_bytes_encodes_base64() {
        let doc = DocumentPayload::from_bytes(b"Q3 report", "application/pdf").unwrap();
        assert_eq!(doc.data, "UTMgcmVwb3J0");
        assert!(DocumentPayload::from_bytes(b"", "application/pdf").is_err());
    }
}
