use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Anomaly detection
// ---------------------------------------------------------------------------

/// The severity level of the anomaly.
///
/// Ordered from least to most severe, so `max()` over a report yields the worst finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[schemars(description = "The severity level of the anomaly.")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnomalyItem {
    #[schemars(description = "A detailed description of the specific anomaly detected.")]
    pub description: String,

    pub severity: Severity,

    #[schemars(
        description = "A recommended action to mitigate the risk associated with the anomaly."
    )]
    pub recommendation: String,
}

/// The four fixed analysis categories of an [`AnomalyReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyCategory {
    Transactional,
    Access,
    Security,
    Reporting,
}

impl AnomalyCategory {
    pub const ALL: [AnomalyCategory; 4] = [
        AnomalyCategory::Transactional,
        AnomalyCategory::Access,
        AnomalyCategory::Security,
        AnomalyCategory::Reporting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnomalyCategory::Transactional => "Transactional",
            AnomalyCategory::Access => "Access & Permission",
            AnomalyCategory::Security => "Security & Compliance",
            AnomalyCategory::Reporting => "Reporting",
        }
    }
}

/// Every category is always present; "nothing found" is an empty array, never a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    #[schemars(
        description = "A brief, one-paragraph natural language summary of the most critical findings. If no anomalies are found, state that the system appears to be operating normally."
    )]
    pub summary: String,

    #[schemars(description = "Anomalies related to financial transactions.")]
    pub transactional_anomalies: Vec<AnomalyItem>,

    #[schemars(description = "Anomalies related to data access and user permissions.")]
    pub access_anomalies: Vec<AnomalyItem>,

    #[schemars(description = "Anomalies related to security threats and compliance.")]
    pub security_anomalies: Vec<AnomalyItem>,

    #[schemars(description = "Anomalies related to report generation and data modification.")]
    pub reporting_anomalies: Vec<AnomalyItem>,
}

impl AnomalyReport {
    pub fn anomalies(&self, category: AnomalyCategory) -> &[AnomalyItem] {
        match category {
            AnomalyCategory::Transactional => &self.transactional_anomalies,
            AnomalyCategory::Access => &self.access_anomalies,
            AnomalyCategory::Security => &self.security_anomalies,
            AnomalyCategory::Reporting => &self.reporting_anomalies,
        }
    }

    pub fn total(&self) -> usize {
        AnomalyCategory::ALL
            .iter()
            .map(|c| self.anomalies(*c).len())
            .sum()
    }

    pub fn is_clear(&self) -> bool {
        self.total() == 0
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        AnomalyCategory::ALL
            .iter()
            .flat_map(|c| self.anomalies(*c))
            .map(|item| item.severity)
            .max()
    }
}

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastItem {
    #[schemars(description = "The forecasted month in 'YYYY-MM' format.")]
    pub month: String,

    #[schemars(description = "The forecasted revenue for the month.")]
    pub forecasted_revenue: f64,

    #[schemars(description = "The forecasted expenses for the month.")]
    pub forecasted_expenses: f64,

    #[schemars(description = "The reasoning behind the forecast.")]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastResponse {
    #[schemars(description = "An array of forecasted financial data for the next 6 months.")]
    pub forecast: Vec<ForecastItem>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportResult {
    #[schemars(
        description = "The generated financial report in a suitable format (e.g., Markdown, JSON)."
    )]
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    #[schemars(description = "A summary of the key findings in the financial report.")]
    pub summary: String,

    #[schemars(description = "An analysis of potential risks identified in the financial report.")]
    pub potential_risks: String,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Flow inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyDetectionInput {
    /// A JSON-formatted string containing financial and operational logs.
    pub financial_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastInput {
    /// JSON array of `{ "month", "revenue", "expenses" }` records.
    pub historical_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub prompt: String,
    pub available_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationInput {
    pub history: Vec<ConversationTurn>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Response schema generation
// ---------------------------------------------------------------------------

/// Keys the model service's schema dialect does not understand.
const UNSUPPORTED_SCHEMA_KEYS: &[&str] = &[
    "$schema",
    "definitions",
    "title",
    "format",
    "additionalProperties",
    "default",
    "examples",
];

/// Generates a Gemini-compatible JSON schema (no $ref, $schema, or definitions)
pub fn gemini_response_schema<T: JsonSchema>() -> Result<Value> {
    let root = serde_json::to_value(schemars::schema_for!(T))?;
    let definitions = root
        .get("definitions")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Ok(clean_schema(&root, &definitions))
}

/// Inlines `$ref`s and collapses single-element `allOf` wrappers.
///
/// Only valid for non-recursive types; every output type in this crate is a tree.
fn clean_schema(node: &Value, definitions: &Map<String, Value>) -> Value {
    match node {
        Value::Object(map) => {
            let mut cleaned = Map::new();

            if let Some(target) = map.get("$ref").and_then(Value::as_str) {
                let name = target.trim_start_matches("#/definitions/");
                if let Some(Value::Object(def)) = definitions
                    .get(name)
                    .map(|d| clean_schema(d, definitions))
                {
                    cleaned.extend(def);
                }
            }

            if let Some(Value::Array(all_of)) = map.get("allOf") {
                if all_of.len() == 1 {
                    if let Value::Object(inner) = clean_schema(&all_of[0], definitions) {
                        cleaned.extend(inner);
                    }
                }
            }

            for (key, value) in map {
                if UNSUPPORTED_SCHEMA_KEYS.contains(&key.as_str()) || key == "$ref" {
                    continue;
                }
                if key == "allOf" && value.as_array().is_some_and(|a| a.len() == 1) {
                    continue;
                }

                let value = match key.as_str() {
                    "properties" => match value {
                        Value::Object(props) => Value::Object(
                            props
                                .iter()
                                .map(|(name, prop)| (name.clone(), clean_schema(prop, definitions)))
                                .collect(),
                        ),
                        other => other.clone(),
                    },
                    "items" | "anyOf" | "oneOf" | "allOf" => clean_schema(value, definitions),
                    _ => value.clone(),
                };
                cleaned.insert(key.clone(), value);
            }

            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| clean_schema(item, definitions))
                .collect(),
        ),
        other => other.clone(),
    }
}
