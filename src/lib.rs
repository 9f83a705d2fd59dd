//! # Relanto Insight
//!
//! Schema-constrained LLM flows behind the Relanto financial dashboard.
//!
//! Every analytical capability (anomaly detection, forecasting, report drafting,
//! report summarization and the "Insight" chat assistant) is delegated to an external
//! model. This crate owns the contracts around that call:
//!
//! - **Schemas**: typed response shapes, sent to the model as a JSON schema and
//!   enforced again when the reply is parsed (closed enums, required categories).
//! - **Prompts**: fixed instruction frames that interpolate caller data.
//! - **Flows**: build request, call the model once, validate, return a typed value.
//! - **Actions**: the caller-facing boundary; local JSON checks, then uniform
//!   [`ActionResult`] envelopes with no error ever escaping.
//!
//! No state is kept between calls. Conversation history is owned by the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use relanto_insight::llm::GeminiClient;
//! use relanto_insight::{InsightActions, SAMPLE_OPERATIONAL_LOGS};
//! use std::sync::Arc;
//!
//! let actions = InsightActions::new(Arc::new(GeminiClient::from_env()));
//!
//! match actions.detect_anomalies(SAMPLE_OPERATIONAL_LOGS).await.into_result() {
//!     Ok(report) => println!("{} anomalies: {}", report.total(), report.summary),
//!     Err(err) => eprintln!("{}", err),
//! }
//! ```

pub mod actions;
pub mod document;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod schema;
pub mod utils;

pub use actions::{ActionError, ActionErrorKind, ActionResult, InsightActions};
pub use document::DocumentPayload;
pub use error::{InsightError, Result};
pub use ingestion::*;
pub use schema::*;
pub use utils::*;
