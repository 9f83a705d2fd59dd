use crate::error::{InsightError, Result, CREDENTIAL_MARKER};
use crate::llm::backend::ModelBackend;
use crate::llm::types::*;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`. A missing key is reported on first use, not here.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(CREDENTIAL_MARKER).ok(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(GeminiConfig::from_env())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_key(&self) -> Result<&str> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(InsightError::MissingApiKey),
        }
    }

    pub async fn generate_content(&self, request: GenerateRequest) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let payload = GenerateContentRequest::from(&request);
        debug!(
            "Gemini request for flow '{}': {} contents, structured={}",
            request.flow,
            payload.contents.len(),
            request.is_structured()
        );

        // Errors leave this client without their URL.
        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.map_err(reqwest::Error::without_url)?;
            if is_key_rejection(status.as_u16(), &err_text) {
                return Err(InsightError::InvalidApiKey(err_text));
            }
            return Err(InsightError::Service(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse =
            res.json().await.map_err(reqwest::Error::without_url)?;
        let text = body.into_text()?;
        debug!(
            "Gemini response for flow '{}': {} chars",
            request.flow,
            text.len()
        );
        Ok(text)
    }
}

impl ModelBackend for GeminiClient {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<String>> {
        self.generate_content(request).boxed()
    }
}

fn is_key_rejection(status: u16, body: &str) -> bool {
    matches!(status, 400 | 401 | 403)
        && (body.contains("API_KEY_INVALID") || body.contains("API key not valid"))
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

impl From<&GenerateRequest> for GenerateContentRequest {
    fn from(request: &GenerateRequest) -> Self {
        let response_mime_type = if request.is_structured() {
            "application/json"
        } else {
            "text/plain"
        };

        Self {
            contents: request.contents.clone(),
            system_instruction: request
                .system_instruction
                .as_ref()
                .map(|text| SystemInstruction {
                    parts: vec![Part::text(text.clone())],
                }),
            generation_config: GenerationConfig {
                response_mime_type: response_mime_type.to_string(),
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate. A candidate without parts yields an empty string.
    fn into_text(self) -> Result<String> {
        let candidate = match self.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                let reason = self
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .map(|r| format!("Prompt was blocked by the model service: {}", r))
                    .unwrap_or_else(|| "No candidates returned".to_string());
                return Err(InsightError::Service(reason));
            }
        };

        Ok(candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentPayload;

    #[test]
    fn test_structured_payload_shape() {
        let request = GenerateRequest::new("detectFinancialAnomalies")
            .system("You are an auditor.")
            .content(Content::user("data"))
            .schema(serde_json::json!({"type": "object"}));

        let payload = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(
            payload["systemInstruction"]["parts"][0]["text"],
            "You are an auditor."
        );
        assert_eq!(payload["contents"][0]["role"], "user");
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "data");
        assert_eq!(
            payload["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(payload["generationConfig"]["responseSchema"]["type"], "object");
    }

    #[test]
    fn test_free_text_payload_has_no_schema() {
        let request = GenerateRequest::new("askAssistant").content(Content::user("hi"));
        let payload = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(payload["generationConfig"]["responseMimeType"], "text/plain");
        assert!(payload["generationConfig"].get("responseSchema").is_none());
        assert!(payload.get("systemInstruction").is_none());
    }

    #[test]
    fn test_document_part_serializes_inline_data() {
        let doc = DocumentPayload::from_data_uri("data:application/pdf;base64,JVBERi0=").unwrap();
        let request =
            GenerateRequest::new("summarize").content(Content::user_with_document("Report:", &doc));
        let payload = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        let part = &payload["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(part["mimeType"], "application/pdf");
        assert_eq!(part["data"], "JVBERi0=");
    }

    #[test]
    fn test_response_text_extraction() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_text().unwrap(), r#"{"a":1}"#);

        let empty: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(empty.into_text().unwrap(), "");

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = blocked.into_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_key_rejection_detection() {
        assert!(is_key_rejection(
            400,
            r#"{"error":{"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#
        ));
        assert!(!is_key_rejection(500, "API_KEY_INVALID"));
        assert!(!is_key_rejection(400, "Invalid JSON payload"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("   ".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        });

        let err = client
            .generate_content(GenerateRequest::new("askAssistant").content(Content::user("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::MissingApiKey));
        assert!(err.is_credential_error());
    }

    #[tokio::test]
    async fn test_transport_errors_never_contain_the_key() {
        let client = GeminiClient::new(
            GeminiConfig::new("AIzaSECRET123").with_base_url("http://127.0.0.1:9"),
        );

        let err = client
            .generate_content(GenerateRequest::new("askAssistant").content(Content::user("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::HttpError(_)));
        assert!(!err.to_string().contains("AIzaSECRET123"));
        assert!(!format!("{:?}", err).contains("AIzaSECRET123"));

        let action_err = crate::actions::ActionError::from(&err);
        assert!(!action_err.message.contains("AIzaSECRET123"));
    }
}
