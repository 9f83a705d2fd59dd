use thiserror::Error;

/// Marker carried by every credential-related error message.
pub const CREDENTIAL_MARKER: &str = "GEMINI_API_KEY";

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("GEMINI_API_KEY was rejected by the model service: {0}")]
    InvalidApiKey(String),

    #[error("Response from flow '{flow}' does not match its schema: {details}")]
    SchemaViolation { flow: String, details: String },

    #[error("{0}")]
    Service(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl InsightError {
    pub fn schema_violation(flow: &str, details: impl Into<String>) -> Self {
        InsightError::SchemaViolation {
            flow: flow.to_string(),
            details: details.into(),
        }
    }

    /// True when the message names the model-service credential.
    pub fn is_credential_error(&self) -> bool {
        self.to_string().contains(CREDENTIAL_MARKER)
    }
}

pub type Result<T> = std::result::Result<T, InsightError>;
