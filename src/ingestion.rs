use crate::error::{InsightError, Result};
use calamine::{Data, Reader};
use log::debug;
use serde_json::{Map, Number, Value};
use std::io::Cursor;
use std::path::Path;

/// Dashboard sample: operational logs covering all four anomaly categories.
pub const SAMPLE_OPERATIONAL_LOGS: &str = include_str!("../data/operational_logs.json");

/// Dashboard sample: twelve months of 2023 revenue and expenses.
pub const SAMPLE_HISTORICAL_DATA: &str = include_str!("../data/historical_financials.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Csv,
    Spreadsheet,
}

impl DataFormat {
    pub fn from_mime(mime_type: &str) -> Result<Self> {
        match mime_type {
            "application/json" => Ok(DataFormat::Json),
            "text/csv" => Ok(DataFormat::Csv),
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Ok(DataFormat::Spreadsheet)
            }
            other => Err(InsightError::InvalidInput(format!(
                "Invalid file type '{}'. Please upload a JSON, CSV, or Excel file.",
                other
            ))),
        }
    }
}

/// Turns uploaded file content into the JSON text the flows expect.
///
/// JSON passes through untouched (syntax is checked later, at dispatch);
/// CSV and the first worksheet of a spreadsheet become a pretty-printed array
/// of header-keyed records.
pub fn ingest_bytes(bytes: &[u8], mime_type: &str) -> Result<String> {
    let format = DataFormat::from_mime(mime_type)?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(InsightError::InvalidInput(
            "File appears to be empty.".to_string(),
        ));
    }

    match format {
        DataFormat::Json => decode_text(bytes),
        DataFormat::Csv => csv_to_json(&decode_text(bytes)?),
        DataFormat::Spreadsheet => spreadsheet_to_json(bytes),
    }
}

pub fn ingest_path(path: &Path) -> Result<String> {
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    let bytes = std::fs::read(path)?;
    debug!(
        "Ingesting {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );
    ingest_bytes(&bytes, &mime_type)
}

/// Converts CSV text to a JSON array of objects keyed by the header row.
///
/// Empty cells are omitted; numeric and boolean cells become JSON numbers and booleans.
pub fn csv_to_json(text: &str) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            row.insert(header.to_string(), cell_value(cell));
        }
        if !row.is_empty() {
            rows.push(Value::Object(row));
        }
    }

    debug!("Converted CSV with {} data rows", rows.len());
    Ok(serde_json::to_string_pretty(&Value::Array(rows))?)
}

/// Converts the first worksheet of an `.xls`/`.xlsx` workbook to JSON records.
///
/// The first row is the header. Empty cells and columns without a header are skipped.
pub fn spreadsheet_to_json(bytes: &[u8]) -> Result<String> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(unreadable_spreadsheet)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InsightError::InvalidInput("Spreadsheet has no worksheets.".to_string()))?
        .map_err(unreadable_spreadsheet)?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(sheet_row.iter()) {
            if header.is_empty() {
                continue;
            }
            if let Some(value) = spreadsheet_value(cell) {
                row.insert(header.clone(), value);
            }
        }
        if !row.is_empty() {
            rows.push(Value::Object(row));
        }
    }

    debug!("Converted worksheet with {} data rows", rows.len());
    Ok(serde_json::to_string_pretty(&Value::Array(rows))?)
}

fn unreadable_spreadsheet(err: calamine::Error) -> InsightError {
    InsightError::InvalidInput(format!("Could not read spreadsheet: {}", err))
}

fn spreadsheet_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(text) if text.trim().is_empty() => None,
        Data::String(text) => Some(cell_value(text.trim())),
        Data::Int(int) => Some(Value::Number((*int).into())),
        Data::Float(float) => Some(float_value(*float)),
        Data::Bool(flag) => Some(Value::Bool(*flag)),
        other => Some(cell_value(&other.to_string())),
    }
}

// Workbooks store every number as a float; whole values read back as integers.
fn float_value(float: f64) -> Value {
    if float.fract() == 0.0 && float.abs() < 9_007_199_254_740_992.0 {
        return Value::Number((float as i64).into());
    }
    Number::from_f64(float)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(float.to_string()))
}

fn cell_value(cell: &str) -> Value {
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    match cell {
        "true" | "TRUE" => Value::Bool(true),
        "false" | "FALSE" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

fn decode_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| InsightError::InvalidInput("File is not valid UTF-8 text.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_becomes_json_records() {
        let csv = "month,revenue,expenses,note\n\
                   2023-11, 7500, 5500.5,\n\
                   2023-12,8100,6100,year end\n";
        let json: Value = serde_json::from_str(&csv_to_json(csv).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                {"month": "2023-11", "revenue": 7500, "expenses": 5500.5},
                {"month": "2023-12", "revenue": 8100, "expenses": 6100, "note": "year end"}
            ])
        );
    }

    #[test]
    fn test_json_passes_through() {
        let raw = br#"{"transactions": []}"#;
        assert_eq!(
            ingest_bytes(raw, "application/json").unwrap(),
            r#"{"transactions": []}"#
        );
    }

    #[test]
    fn test_rejects_unsupported_and_empty_files() {
        assert!(matches!(
            ingest_bytes(b"hello", "text/plain"),
            Err(InsightError::InvalidInput(_))
        ));
        assert!(matches!(
            ingest_bytes(b"  \n", "text/csv"),
            Err(InsightError::InvalidInput(msg)) if msg == "File appears to be empty."
        ));
        assert!(matches!(
            ingest_bytes(b"PK\x03\x04", "application/vnd.ms-excel"),
            Err(InsightError::InvalidInput(msg)) if msg.starts_with("Could not read spreadsheet")
        ));
    }

    #[test]
    fn test_first_worksheet_becomes_json_records() {
        let workbook = include_bytes!("../tests/fixtures/monthly_financials.xlsx");
        let converted = ingest_bytes(
            workbook,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )
        .unwrap();
        let json: Value = serde_json::from_str(&converted).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                {"month": "2023-11", "revenue": 7500, "expenses": 5500.5},
                {"month": "2023-12", "revenue": 8100, "expenses": 6100, "note": "year end"}
            ])
        );
    }

    #[test]
    fn test_spreadsheet_cell_values() {
        assert_eq!(spreadsheet_value(&Data::Empty), None);
        assert_eq!(spreadsheet_value(&Data::String("  ".to_string())), None);
        assert_eq!(
            spreadsheet_value(&Data::Float(42.0)),
            Some(serde_json::json!(42))
        );
        assert_eq!(
            spreadsheet_value(&Data::String(" Payroll ".to_string())),
            Some(serde_json::json!("Payroll"))
        );
        assert_eq!(
            spreadsheet_value(&Data::Bool(false)),
            Some(serde_json::json!(false))
        );
    }

    #[test]
    fn test_samples_are_valid_json() {
        let logs: Value = serde_json::from_str(SAMPLE_OPERATIONAL_LOGS).unwrap();
        for key in [
            "transactions",
            "access_logs",
            "security_events",
            "reporting_activity",
        ] {
            assert!(logs.get(key).is_some(), "sample is missing {}", key);
        }

        let history: Value = serde_json::from_str(SAMPLE_HISTORICAL_DATA).unwrap();
        assert_eq!(history.as_array().unwrap().len(), 12);
    }
}
