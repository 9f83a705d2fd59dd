use log::info;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::backend::ModelBackend;
use crate::llm::prompts::{anomaly_user_prompt, ANOMALY_SYSTEM_PROMPT};
use crate::llm::types::{Content, GenerateRequest};
use crate::llm::utils::{run_structured, structured_request};
use crate::schema::{AnomalyDetectionInput, AnomalyReport};

pub const DETECT_ANOMALIES_FLOW: &str = "detectFinancialAnomalies";

/// Scans operational logs for transactional, access, security and reporting anomalies.
#[derive(Clone)]
pub struct AnomalyDetector {
    backend: Arc<dyn ModelBackend>,
}

impl AnomalyDetector {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn build_request(input: &AnomalyDetectionInput) -> Result<GenerateRequest> {
        structured_request::<AnomalyReport>(
            DETECT_ANOMALIES_FLOW,
            ANOMALY_SYSTEM_PROMPT,
            Content::user(anomaly_user_prompt(&input.financial_data)),
        )
    }

    pub async fn detect(&self, input: &AnomalyDetectionInput) -> Result<AnomalyReport> {
        info!(
            "Anomaly detection: analysing {} bytes of operational data",
            input.financial_data.len()
        );

        let request = Self::build_request(input)?;
        let report: AnomalyReport = run_structured(self.backend.as_ref(), request).await?;

        info!(
            "Anomaly detection: {} anomalies found (highest severity: {})",
            report.total(),
            report
                .highest_severity()
                .map(|s| s.as_str())
                .unwrap_or("none")
        );
        Ok(report)
    }
}
