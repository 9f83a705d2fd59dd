//! Caller-facing operations.
//!
//! Every operation returns an [`ActionResult`]; errors never cross this boundary.
//! JSON-bearing inputs are syntax-checked locally before any model call.

use log::{error, warn};
use serde::de::IgnoredAny;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

use crate::document::DocumentPayload;
use crate::error::InsightError;
use crate::llm::{
    AnomalyDetector, ConversationAssistant, Forecaster, ModelBackend, ReportGenerator,
    ReportSummarizer,
};
use crate::schema::{
    AnomalyDetectionInput, AnomalyReport, ConversationInput, ConversationTurn, ForecastInput,
    ForecastItem, ReportRequest, SummaryResult,
};

pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON format. Please check your data.";

pub const MISSING_API_KEY_MESSAGE: &str = "Missing Gemini API Key. Please add GEMINI_API_KEY to your .env file and restart the server. You can get a free key from Google AI Studio.";

pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred while contacting the AI.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionErrorKind {
    /// Caller data failed local validation; no model call was made.
    InputFormat,
    /// The model-service credential is missing or rejected.
    Configuration,
    /// Any other failure of the model call, including schema mismatches.
    Service,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionError {
    pub kind: ActionErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn invalid_json() -> Self {
        Self {
            kind: ActionErrorKind::InputFormat,
            message: INVALID_JSON_MESSAGE.to_string(),
        }
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&InsightError> for ActionError {
    fn from(err: &InsightError) -> Self {
        if err.is_credential_error() {
            return Self {
                kind: ActionErrorKind::Configuration,
                message: MISSING_API_KEY_MESSAGE.to_string(),
            };
        }

        let kind = match err {
            InsightError::InvalidInput(_) | InsightError::InvalidDocument(_) => {
                ActionErrorKind::InputFormat
            }
            _ => ActionErrorKind::Service,
        };

        let message = err.to_string();
        Self {
            kind,
            message: if message.trim().is_empty() {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            } else {
                message
            },
        }
    }
}

/// Exactly one of a value or an error.
///
/// Serializes as `{"value": ..., "error": null}` or `{"value": null, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Value(T),
    Error(ActionError),
}

impl<T> ActionResult<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            ActionResult::Value(value) => Some(value),
            ActionResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            ActionResult::Value(_) => None,
            ActionResult::Error(err) => Some(err),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, ActionResult::Value(_))
    }

    pub fn into_result(self) -> std::result::Result<T, ActionError> {
        match self {
            ActionResult::Value(value) => Ok(value),
            ActionResult::Error(err) => Err(err),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResult<U> {
        match self {
            ActionResult::Value(value) => ActionResult::Value(f(value)),
            ActionResult::Error(err) => ActionResult::Error(err),
        }
    }
}

impl<T> From<crate::error::Result<T>> for ActionResult<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => ActionResult::Value(value),
            Err(err) => {
                error!("AI flow failed: {}", err);
                ActionResult::Error(ActionError::from(&err))
            }
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ActionResult", 2)?;
        match self {
            ActionResult::Value(value) => {
                state.serialize_field("value", value)?;
                state.serialize_field("error", &Option::<String>::None)?;
            }
            ActionResult::Error(err) => {
                state.serialize_field("value", &Option::<()>::None)?;
                state.serialize_field("error", &err.message)?;
            }
        }
        state.end()
    }
}

/// The single boundary between the dashboard and the flows.
#[derive(Clone)]
pub struct InsightActions {
    anomalies: AnomalyDetector,
    forecaster: Forecaster,
    reports: ReportGenerator,
    summarizer: ReportSummarizer,
    assistant: ConversationAssistant,
}

impl InsightActions {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            anomalies: AnomalyDetector::new(backend.clone()),
            forecaster: Forecaster::new(backend.clone()),
            reports: ReportGenerator::new(backend.clone()),
            summarizer: ReportSummarizer::new(backend.clone()),
            assistant: ConversationAssistant::new(backend),
        }
    }

    pub async fn generate_report(
        &self,
        prompt: &str,
        available_data: &str,
    ) -> ActionResult<String> {
        let input = ReportRequest {
            prompt: prompt.to_string(),
            available_data: available_data.to_string(),
        };
        ActionResult::from(self.reports.generate(&input).await).map(|r| r.report)
    }

    pub async fn detect_anomalies(&self, financial_data: &str) -> ActionResult<AnomalyReport> {
        if let Err(err) = check_json(financial_data) {
            return ActionResult::Error(err);
        }

        let input = AnomalyDetectionInput {
            financial_data: financial_data.to_string(),
        };
        ActionResult::from(self.anomalies.detect(&input).await)
    }

    pub async fn forecast_financials(
        &self,
        historical_data: &str,
    ) -> ActionResult<Vec<ForecastItem>> {
        if let Err(err) = check_json(historical_data) {
            return ActionResult::Error(err);
        }

        let input = ForecastInput {
            historical_data: historical_data.to_string(),
        };
        ActionResult::from(self.forecaster.forecast(&input).await)
    }

    pub async fn chat(&self, history: &[ConversationTurn], message: &str) -> ActionResult<String> {
        let input = ConversationInput {
            history: history.to_vec(),
            message: message.to_string(),
        };
        ActionResult::from(self.assistant.ask(&input).await)
    }

    pub async fn summarize_report(
        &self,
        document: &DocumentPayload,
    ) -> ActionResult<SummaryResult> {
        ActionResult::from(self.summarizer.summarize(document).await)
    }
}

/// Syntax-only check with unbounded nesting depth.
fn check_json(data: &str) -> std::result::Result<(), ActionError> {
    let mut de = serde_json::Deserializer::from_str(data);
    de.disable_recursion_limit();
    let parsed = IgnoredAny::deserialize(serde_stacker::Deserializer::new(&mut de));

    match parsed.and_then(|_| de.end()) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("Rejected malformed JSON input: {}", e);
            Err(ActionError::invalid_json())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_get_remediation_message() {
        let err = ActionError::from(&InsightError::MissingApiKey);
        assert_eq!(err.kind, ActionErrorKind::Configuration);
        assert_eq!(err.message, MISSING_API_KEY_MESSAGE);

        let err = ActionError::from(&InsightError::Service(
            "upstream said: GEMINI_API_KEY environment variable not found".to_string(),
        ));
        assert_eq!(err.kind, ActionErrorKind::Configuration);
    }

    #[test]
    fn test_service_errors_pass_through() {
        let err = ActionError::from(&InsightError::Service("deadline exceeded".to_string()));
        assert_eq!(err.kind, ActionErrorKind::Service);
        assert_eq!(err.message, "deadline exceeded");
    }

    #[test]
    fn test_empty_messages_fall_back_to_generic_text() {
        let err = ActionError::from(&InsightError::Service("   ".to_string()));
        assert_eq!(err.message, UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_action_result_wire_shape() {
        let ok: ActionResult<String> = ActionResult::Value("# Report".to_string());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"value": "# Report", "error": null})
        );

        let failed: ActionResult<String> = ActionResult::Error(ActionError::invalid_json());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"value": null, "error": INVALID_JSON_MESSAGE})
        );
    }

    #[test]
    fn test_check_json() {
        assert!(check_json(r#"{"transactions": []}"#).is_ok());
        assert!(check_json("[]").is_ok());
        assert!(check_json("{transactions: []}").is_err());
        assert!(check_json("").is_err());
        assert!(check_json("{} trailing").is_err());
    }

    #[test]
    fn test_check_json_accepts_deep_nesting() {
        let depth = 5_000;
        let nested = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        assert!(check_json(&nested).is_ok());

        let unbalanced = format!("{}{}", "[".repeat(depth), "]".repeat(depth - 1));
        assert!(check_json(&unbalanced).is_err());
    }
}
