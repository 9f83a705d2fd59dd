use log::info;
use std::sync::Arc;

use crate::document::DocumentPayload;
use crate::error::Result;
use crate::llm::backend::ModelBackend;
use crate::llm::prompts::{
    report_user_prompt, REPORT_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT, SUMMARY_USER_PROMPT,
};
use crate::llm::types::{Content, GenerateRequest};
use crate::llm::utils::{run_structured, structured_request};
use crate::schema::{ReportRequest, ReportResult, SummaryResult};

pub const GENERATE_REPORT_FLOW: &str = "generateReportFromPrompt";
pub const SUMMARIZE_REPORT_FLOW: &str = "summarizeFinancialReport";

/// Drafts a report from a natural-language request.
///
/// Format compliance (e.g. "as a CSV table") is left to the model.
#[derive(Clone)]
pub struct ReportGenerator {
    backend: Arc<dyn ModelBackend>,
}

impl ReportGenerator {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn build_request(input: &ReportRequest) -> Result<GenerateRequest> {
        structured_request::<ReportResult>(
            GENERATE_REPORT_FLOW,
            REPORT_SYSTEM_PROMPT,
            Content::user(report_user_prompt(&input.prompt, &input.available_data)),
        )
    }

    pub async fn generate(&self, input: &ReportRequest) -> Result<ReportResult> {
        info!("Report generation: prompt of {} chars", input.prompt.len());
        let request = Self::build_request(input)?;
        run_structured(self.backend.as_ref(), request).await
    }
}

/// Key findings and risks from an attached report document.
#[derive(Clone)]
pub struct ReportSummarizer {
    backend: Arc<dyn ModelBackend>,
}

impl ReportSummarizer {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn build_request(document: &DocumentPayload) -> Result<GenerateRequest> {
        structured_request::<SummaryResult>(
            SUMMARIZE_REPORT_FLOW,
            SUMMARY_SYSTEM_PROMPT,
            Content::user_with_document(SUMMARY_USER_PROMPT, document),
        )
    }

    pub async fn summarize(&self, document: &DocumentPayload) -> Result<SummaryResult> {
        info!(
            "Report summarization: {} document ({} base64 chars)",
            document.mime_type,
            document.data.len()
        );
        let request = Self::build_request(document)?;
        run_structured(self.backend.as_ref(), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Part;

    #[test]
    fn test_summary_request_attaches_document() {
        let doc = DocumentPayload::from_bytes(b"Revenue fell 12%", "text/plain").unwrap();
        let request = ReportSummarizer::build_request(&doc).unwrap();

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(
            &parts[1],
            Part::InlineData { inline_data } if inline_data.mime_type == "text/plain"
        ));
        assert!(request.response_schema.as_ref().unwrap()["properties"]
            .get("potentialRisks")
            .is_some());
    }
}
