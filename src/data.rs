//! Sales CSV loading and record validation
//!
//! Two historic column layouts are accepted: the exported transaction file
//! (`transaction_date`, `product_category`, `location`, `sales_amount`) and the
//! dashboard demo layout (`date`, `category`, `emirate`, `amount`). Only the
//! customer id, date and amount are required.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{SegmentError, SegmentResult};
use crate::model::Transaction;

/// A validated sales row
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub transaction_id: String,
    pub timestamp: NaiveDateTime,
    pub customer_id: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub location: Option<String>,
    pub loyalty_tier: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub amount: f64,
    pub payment_type: Option<String>,
}

impl SalesRecord {
    /// The fields segmentation needs
    pub fn to_transaction(&self) -> Transaction {
        Transaction::new(self.customer_id.clone(), self.timestamp, self.amount)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Convert sales records into segmentation input
pub fn to_transactions(records: &[SalesRecord]) -> Vec<Transaction> {
    records.iter().map(SalesRecord::to_transaction).collect()
}

/// Raw CSV row before validation; every field is text so errors can name the column
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(alias = "date", default)]
    transaction_date: Option<String>,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(alias = "emirate", default)]
    location: Option<String>,
    #[serde(default)]
    loyalty_tier: Option<String>,
    #[serde(alias = "category", default)]
    product_category: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(alias = "amount", default)]
    sales_amount: Option<String>,
    #[serde(default)]
    payment_type: Option<String>,
}

/// Ingestion outcome when invalid rows are skipped rather than fatal
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<SalesRecord>,
    pub rejected: Vec<SegmentError>,
}

/// Parse the timestamp formats seen in sales exports
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(line: usize, field: &'static str, reason: String) -> SegmentError {
    SegmentError::InvalidRecord {
        record: line,
        field,
        reason,
    }
}

fn parse_optional<T: std::str::FromStr>(
    line: usize,
    field: &'static str,
    value: Option<String>,
) -> SegmentResult<Option<T>> {
    match non_empty(value) {
        None => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(line, field, format!("'{}' is not a valid {}", v, field))),
    }
}

/// Validate one raw row; `line` is the 1-based line in the file
fn validate(line: usize, row: RawRow) -> SegmentResult<SalesRecord> {
    let customer_id = non_empty(row.customer_id)
        .ok_or_else(|| invalid(line, "customer_id", "missing customer id".to_string()))?;

    let raw_date = non_empty(row.transaction_date)
        .ok_or_else(|| invalid(line, "transaction_date", "missing date".to_string()))?;
    let timestamp = parse_timestamp(&raw_date).ok_or_else(|| {
        invalid(
            line,
            "transaction_date",
            format!("'{}' is not a recognised date", raw_date),
        )
    })?;

    let raw_amount = non_empty(row.sales_amount)
        .ok_or_else(|| invalid(line, "sales_amount", "missing amount".to_string()))?;
    let amount: f64 = raw_amount
        .parse()
        .map_err(|_| invalid(line, "sales_amount", format!("'{}' is not a number", raw_amount)))?;
    if !amount.is_finite() {
        return Err(invalid(
            line,
            "sales_amount",
            format!("'{}' is not a finite amount", raw_amount),
        ));
    }

    Ok(SalesRecord {
        transaction_id: non_empty(row.transaction_id).unwrap_or_else(|| format!("L{}", line)),
        timestamp,
        customer_id,
        age: parse_optional(line, "age", row.age)?,
        gender: non_empty(row.gender),
        nationality: non_empty(row.nationality),
        location: non_empty(row.location),
        loyalty_tier: non_empty(row.loyalty_tier),
        category: non_empty(row.product_category),
        quantity: parse_optional(line, "quantity", row.quantity)?,
        amount,
        payment_type: non_empty(row.payment_type),
    })
}

/// Read sales rows, optionally skipping invalid ones.
///
/// Records come back sorted by timestamp.
pub fn load_sales_with<R: Read>(reader: R, skip_invalid: bool) -> SegmentResult<LoadReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| invalid(1, "header", e.to_string()))?
        .clone();

    let mut report = LoadReport::default();
    for result in csv_reader.records() {
        // Lines are where each record starts, so quoted line breaks are accounted for
        let outcome = match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line() as usize);
                record
                    .deserialize::<RawRow>(Some(&headers))
                    .map_err(|e| invalid(line, "row", e.to_string()))
                    .and_then(|row| validate(line, row))
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line() as usize);
                Err(invalid(line, "row", e.to_string()))
            }
        };

        match outcome {
            Ok(record) => report.records.push(record),
            Err(err) if skip_invalid => {
                tracing::warn!(error = %err, "skipping invalid sales record");
                report.rejected.push(err);
            }
            Err(err) => return Err(err),
        }
    }

    report.records.sort_by_key(|r| r.timestamp);
    tracing::debug!(
        loaded = report.records.len(),
        rejected = report.rejected.len(),
        "sales records read"
    );
    Ok(report)
}

/// Read sales rows, failing on the first invalid record
pub fn load_sales<R: Read>(reader: R) -> SegmentResult<Vec<SalesRecord>> {
    load_sales_with(reader, false).map(|report| report.records)
}

/// Load a sales CSV from disk
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `skip_invalid` - Drop and log invalid rows instead of failing
///
/// # Returns
/// * `LoadReport` with records sorted by timestamp
pub fn load_sales_file<P: AsRef<Path>>(file_path: P, skip_invalid: bool) -> crate::Result<LoadReport> {
    let path = file_path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let report = load_sales_with(file, skip_invalid)
        .with_context(|| format!("failed to load sales from '{}'", path.display()))?;

    if report.records.is_empty() {
        anyhow::bail!("No valid sales records found in '{}'", path.display());
    }
    Ok(report)
}
