//! CSV exports for segments, loyalty members, ad budgets and transactions

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::analytics::{AdBudget, LoyaltyMember};
use crate::data::SalesRecord;
use crate::model::{CustomerSummary, Segment};

#[derive(Serialize)]
struct SegmentRow<'a> {
    customer_id: &'a str,
    recency: i64,
    frequency: usize,
    monetary: f64,
    r_score: u8,
    f_score: u8,
    m_score: u8,
    rfm_score: u8,
    rfm_segment_code: String,
    segment: Segment,
}

#[derive(Serialize)]
struct TransactionRow<'a> {
    transaction_id: &'a str,
    transaction_date: String,
    customer_id: &'a str,
    age: Option<u32>,
    gender: Option<&'a str>,
    nationality: Option<&'a str>,
    location: Option<&'a str>,
    loyalty_tier: Option<&'a str>,
    product_category: Option<&'a str>,
    quantity: Option<u32>,
    sales_amount: f64,
    payment_type: Option<&'a str>,
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: impl IntoIterator<Item = T>) -> crate::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_segments<W: Write>(writer: W, customers: &[CustomerSummary]) -> crate::Result<()> {
    write_rows(
        writer,
        customers.iter().map(|c| SegmentRow {
            customer_id: &c.customer_id,
            recency: c.recency,
            frequency: c.frequency,
            monetary: c.monetary,
            r_score: c.r_score,
            f_score: c.f_score,
            m_score: c.m_score,
            rfm_score: c.rfm_score,
            rfm_segment_code: c.rfm_segment_code(),
            segment: c.segment,
        }),
    )
}

pub fn write_loyalty<W: Write>(writer: W, members: &[LoyaltyMember]) -> crate::Result<()> {
    write_rows(writer, members)
}

pub fn write_ad_budget<W: Write>(writer: W, budget: &[AdBudget]) -> crate::Result<()> {
    write_rows(writer, budget)
}

/// Transactions in the export layout; midnight timestamps are written as plain dates
pub fn write_transactions<W: Write>(writer: W, records: &[SalesRecord]) -> crate::Result<()> {
    write_rows(
        writer,
        records.iter().map(|r| TransactionRow {
            transaction_id: &r.transaction_id,
            transaction_date: if r.timestamp.time() == chrono::NaiveTime::MIN {
                r.timestamp.format("%Y-%m-%d").to_string()
            } else {
                r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
            },
            customer_id: &r.customer_id,
            age: r.age,
            gender: r.gender.as_deref(),
            nationality: r.nationality.as_deref(),
            location: r.location.as_deref(),
            loyalty_tier: r.loyalty_tier.as_deref(),
            product_category: r.category.as_deref(),
            quantity: r.quantity,
            sales_amount: r.amount,
            payment_type: r.payment_type.as_deref(),
        }),
    )
}

/// Create `path` (and its parent directories) and hand it to `write`
pub fn export_to_file<F>(path: &Path, write: F) -> crate::Result<()>
where
    F: FnOnce(File) -> crate::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;
    write(file).with_context(|| format!("failed to write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "export written");
    Ok(())
}
