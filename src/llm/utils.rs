use log::debug;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::error::{InsightError, Result};
use crate::llm::backend::ModelBackend;
use crate::llm::types::{Content, GenerateRequest};
use crate::schema::gemini_response_schema;

/// Builds a schema-constrained request for `T`.
pub fn structured_request<T: JsonSchema>(
    flow: &str,
    system_prompt: &str,
    content: Content,
) -> Result<GenerateRequest> {
    Ok(GenerateRequest::new(flow)
        .system(system_prompt.trim())
        .content(content)
        .schema(gemini_response_schema::<T>()?))
}

/// One model call, then strict parsing of the reply into `T`.
pub async fn run_structured<T, B>(backend: &B, request: GenerateRequest) -> Result<T>
where
    T: DeserializeOwned,
    B: ModelBackend + ?Sized,
{
    let flow = request.flow.clone();
    let raw = backend.generate(request).await?;
    debug!("Flow '{}' received {} chars", flow, raw.len());
    parse_structured(&flow, &raw)
}

pub fn parse_structured<T: DeserializeOwned>(flow: &str, raw: &str) -> Result<T> {
    if raw.trim().is_empty() {
        return Err(InsightError::schema_violation(flow, "model returned no output"));
    }
    let cleaned = clean_json_output(raw);
    serde_json::from_str(&cleaned).map_err(|e| InsightError::schema_violation(flow, e.to_string()))
}

/// Strips markdown fences or chatter around the outermost JSON value.
pub fn clean_json_output(raw: &str) -> String {
    let object = raw.find('{').zip(raw.rfind('}'));
    let array = raw.find('[').zip(raw.rfind(']'));

    let span = match (object, array) {
        (Some(o), Some(a)) => Some(if a.0 < o.0 { a } else { o }),
        (Some(o), None) => Some(o),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    };

    match span {
        Some((start, end)) if start <= end => raw[start..=end].to_string(),
        _ => raw.trim().to_string(),
    }
}
