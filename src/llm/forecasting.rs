use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

use crate::error::{InsightError, Result};
use crate::llm::backend::ModelBackend;
use crate::llm::prompts::{forecast_user_prompt, FORECAST_SYSTEM_PROMPT};
use crate::llm::types::{Content, GenerateRequest};
use crate::llm::utils::{run_structured, structured_request};
use crate::schema::{ForecastInput, ForecastItem, ForecastResponse};
use crate::utils::{
    format_year_month, latest_historical_month, months_after, next_month_start, parse_year_month,
};

pub const FORECAST_FLOW: &str = "forecastFinancials";
pub const FORECAST_HORIZON: usize = 6;

/// Six-month revenue/expense forecast from historical monthly records.
#[derive(Clone)]
pub struct Forecaster {
    backend: Arc<dyn ModelBackend>,
}

impl Forecaster {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn build_request(input: &ForecastInput) -> Result<GenerateRequest> {
        let expected = latest_historical_month(&input.historical_data)
            .map(|last| months_after(last, FORECAST_HORIZON));

        structured_request::<ForecastResponse>(
            FORECAST_FLOW,
            FORECAST_SYSTEM_PROMPT,
            Content::user(forecast_user_prompt(
                &input.historical_data,
                expected.as_deref(),
            )),
        )
    }

    pub async fn forecast(&self, input: &ForecastInput) -> Result<Vec<ForecastItem>> {
        let last_month = latest_historical_month(&input.historical_data);
        match last_month {
            Some(last) => info!(
                "Forecasting {} months after {}",
                FORECAST_HORIZON,
                format_year_month(last)
            ),
            None => warn!("Forecasting without a recognisable last historical month"),
        }

        let request = Self::build_request(input)?;
        let response: ForecastResponse = run_structured(self.backend.as_ref(), request).await?;

        validate_forecast(&response.forecast, last_month)?;
        Ok(response.forecast)
    }
}

/// Exactly six consecutive `YYYY-MM` months, starting right after `last_historical` when known.
pub fn validate_forecast(
    forecast: &[ForecastItem],
    last_historical: Option<NaiveDate>,
) -> Result<()> {
    if forecast.len() != FORECAST_HORIZON {
        return Err(InsightError::schema_violation(
            FORECAST_FLOW,
            format!(
                "expected {} forecast months, got {}",
                FORECAST_HORIZON,
                forecast.len()
            ),
        ));
    }

    let mut expected = last_historical.map(next_month_start);

    for (idx, item) in forecast.iter().enumerate() {
        let month = parse_year_month(&item.month).map_err(|e| {
            InsightError::schema_violation(FORECAST_FLOW, format!("entry #{}: {}", idx, e))
        })?;

        if let Some(expected_month) = expected {
            if month != expected_month {
                return Err(InsightError::schema_violation(
                    FORECAST_FLOW,
                    format!(
                        "entry #{} is {} but {} was expected",
                        idx,
                        item.month,
                        format_year_month(expected_month)
                    ),
                ));
            }
        }

        expected = Some(next_month_start(month));
    }

    Ok(())
}
