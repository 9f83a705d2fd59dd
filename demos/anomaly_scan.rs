use anyhow::{anyhow, Result};
use dotenv::dotenv;
use relanto_insight::llm::GeminiClient;
use relanto_insight::{
    ingest_path, AnomalyCategory, InsightActions, SAMPLE_HISTORICAL_DATA, SAMPLE_OPERATIONAL_LOGS,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Usage: `cargo run --example anomaly_scan --features gemini -- [logs.json|logs.csv|logs.xlsx]`
///
/// Without an argument the dashboard's sample logs are scanned.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let data = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ingest_path(&path)?,
        None => SAMPLE_OPERATIONAL_LOGS.to_string(),
    };

    let actions = InsightActions::new(Arc::new(GeminiClient::from_env()));

    println!("🔍 Scanning operational logs...\n");
    let report = actions
        .detect_anomalies(&data)
        .await
        .into_result()
        .map_err(|e| anyhow!(e.message))?;

    println!("{}\n", report.summary);
    for category in AnomalyCategory::ALL {
        let items = report.anomalies(category);
        println!("== {} ({}) ==", category.label(), items.len());
        for item in items {
            println!("  [{}] {}", item.severity, item.description);
            println!("      → {}", item.recommendation);
        }
    }

    println!("\n📈 Six-month outlook from the sample history...\n");
    match actions
        .forecast_financials(SAMPLE_HISTORICAL_DATA)
        .await
        .into_result()
    {
        Ok(forecast) => {
            for item in forecast {
                println!(
                    "  {}  revenue {:>10.2}  expenses {:>10.2}  {}",
                    item.month, item.forecasted_revenue, item.forecasted_expenses, item.reasoning
                );
            }
        }
        Err(e) => eprintln!("❌ Forecast failed: {}", e),
    }

    Ok(())
}
