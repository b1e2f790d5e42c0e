//! Descriptive sales aggregates: KPIs, breakdowns, filters, loyalty and ad budget

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use crate::data::SalesRecord;
use crate::model::{CustomerSummary, Segment};

/// Restricts the records that feed the dashboard
#[derive(Debug, Clone, Default)]
pub struct SalesFilter {
    /// Inclusive
    pub from: Option<NaiveDate>,
    /// Inclusive
    pub to: Option<NaiveDate>,
    pub categories: Vec<String>,
    pub locations: Vec<String>,
    pub genders: Vec<String>,
}

fn allowed(allow_list: &[String], value: Option<&str>) -> bool {
    if allow_list.is_empty() {
        return true;
    }
    value.is_some_and(|v| allow_list.iter().any(|a| a.eq_ignore_ascii_case(v)))
}

impl SalesFilter {
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.categories.is_empty()
            && self.locations.is_empty()
            && self.genders.is_empty()
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        let date = record.date();
        self.from.map_or(true, |from| date >= from)
            && self.to.map_or(true, |to| date <= to)
            && allowed(&self.categories, record.category.as_deref())
            && allowed(&self.locations, record.location.as_deref())
            && allowed(&self.genders, record.gender.as_deref())
    }

    pub fn apply(&self, records: &[SalesRecord]) -> Vec<SalesRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Headline figures
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kpis {
    pub total_sales: f64,
    pub transactions: usize,
    pub unique_customers: usize,
    pub avg_transaction_value: f64,
    pub total_items: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

pub fn compute_kpis(records: &[SalesRecord]) -> Kpis {
    if records.is_empty() {
        return Kpis::default();
    }

    let total_sales: f64 = records.iter().map(|r| r.amount).sum();
    let customers: HashSet<&str> = records.iter().map(|r| r.customer_id.as_str()).collect();

    Kpis {
        total_sales,
        transactions: records.len(),
        unique_customers: customers.len(),
        avg_transaction_value: total_sales / records.len() as f64,
        total_items: records.iter().map(|r| u64::from(r.quantity.unwrap_or(1))).sum(),
        first_date: records.iter().map(SalesRecord::date).min(),
        last_date: records.iter().map(SalesRecord::date).max(),
    }
}

/// Attribute used to group sales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category,
    Gender,
    Location,
    Nationality,
    AgeBand,
    LoyaltyTier,
    PaymentType,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Category => "Category",
            Dimension::Gender => "Gender",
            Dimension::Location => "Location",
            Dimension::Nationality => "Nationality",
            Dimension::AgeBand => "Age band",
            Dimension::LoyaltyTier => "Loyalty tier",
            Dimension::PaymentType => "Payment type",
        };
        f.write_str(name)
    }
}

pub const UNKNOWN: &str = "Unknown";

pub fn age_band(age: Option<u32>) -> &'static str {
    match age {
        Some(0..=24) => "16-24",
        Some(25..=34) => "25-34",
        Some(35..=44) => "35-44",
        Some(45..=54) => "45-54",
        Some(_) => "55+",
        None => UNKNOWN,
    }
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Category,
        Dimension::Gender,
        Dimension::Location,
        Dimension::Nationality,
        Dimension::AgeBand,
        Dimension::LoyaltyTier,
        Dimension::PaymentType,
    ];

    /// Column holding this dimension in the sales frame
    fn column(&self) -> &'static str {
        match self {
            Dimension::Category => "category",
            Dimension::Gender => "gender",
            Dimension::Location => "location",
            Dimension::Nationality => "nationality",
            Dimension::AgeBand => "age_band",
            Dimension::LoyaltyTier => "loyalty_tier",
            Dimension::PaymentType => "payment_type",
        }
    }

    fn key<'a>(&self, record: &'a SalesRecord) -> &'a str {
        let value = match self {
            Dimension::Category => record.category.as_deref(),
            Dimension::Gender => record.gender.as_deref(),
            Dimension::Location => record.location.as_deref(),
            Dimension::Nationality => record.nationality.as_deref(),
            Dimension::AgeBand => Some(age_band(record.age)),
            Dimension::LoyaltyTier => record.loyalty_tier.as_deref(),
            Dimension::PaymentType => record.payment_type.as_deref(),
        };
        value.unwrap_or(UNKNOWN)
    }
}

/// One row per sale with every dimension resolved, missing values as `UNKNOWN`
pub fn sales_frame(records: &[SalesRecord]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = vec![
        Column::new(
            "customer_id".into(),
            records.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "month".into(),
            records
                .iter()
                .map(|r| r.timestamp.format("%Y-%m").to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "amount".into(),
            records.iter().map(|r| r.amount).collect::<Vec<_>>(),
        ),
    ];
    for dimension in Dimension::ALL {
        let keys: Vec<&str> = records.iter().map(|r| dimension.key(r)).collect();
        columns.push(Column::new(dimension.column().into(), keys));
    }
    DataFrame::new(columns)
}

/// Sales attributed to one key of a dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub sales: f64,
    pub transactions: usize,
    /// Share of total sales, in percent
    pub share_pct: f64,
}

/// Sum sales and count rows per `key_column`
fn grouped_sales(frame: DataFrame, key_column: &str) -> LazyFrame {
    frame.lazy().group_by([col(key_column).alias("key")]).agg([
        col("amount").sum().alias("sales"),
        len().cast(DataType::Int64).alias("transactions"),
    ])
}

fn group_totals(grouped: &DataFrame, total: f64) -> PolarsResult<Vec<GroupTotal>> {
    let keys = grouped.column("key")?.str()?;
    let sales = grouped.column("sales")?.f64()?;
    let transactions = grouped.column("transactions")?.i64()?;

    Ok(keys
        .into_no_null_iter()
        .zip(sales.into_no_null_iter())
        .zip(transactions.into_no_null_iter())
        .map(|((key, sales), transactions)| GroupTotal {
            key: key.to_string(),
            sales,
            transactions: transactions as usize,
            share_pct: if total != 0.0 { sales / total * 100.0 } else { 0.0 },
        })
        .collect())
}

fn total_sales(frame: &DataFrame) -> PolarsResult<f64> {
    Ok(frame.column("amount")?.f64()?.sum().unwrap_or(0.0))
}

/// Sales per key of `dimension`, largest first (ties by key)
pub fn breakdown(records: &[SalesRecord], dimension: Dimension) -> crate::Result<Vec<GroupTotal>> {
    let frame = sales_frame(records)?;
    let total = total_sales(&frame)?;
    let grouped = grouped_sales(frame, dimension.column())
        .sort(
            ["sales", "key"],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;
    Ok(group_totals(&grouped, total)?)
}

/// Sales per `YYYY-MM`, chronological
pub fn monthly_trend(records: &[SalesRecord]) -> crate::Result<Vec<GroupTotal>> {
    let frame = sales_frame(records)?;
    let total = total_sales(&frame)?;
    let grouped = grouped_sales(frame, "month")
        .sort(["key"], SortMultipleOptions::default())
        .collect()?;
    Ok(group_totals(&grouped, total)?)
}

/// Spend and visit count per customer and loyalty tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltyMember {
    pub customer_id: String,
    pub loyalty_tier: String,
    pub sales_amount: f64,
    pub transactions: usize,
}

/// Per customer and tier, ordered by customer id
pub fn loyalty_summary(records: &[SalesRecord]) -> crate::Result<Vec<LoyaltyMember>> {
    let grouped = sales_frame(records)?
        .lazy()
        .group_by([col("customer_id"), col("loyalty_tier")])
        .agg([
            col("amount").sum().alias("sales_amount"),
            len().cast(DataType::Int64).alias("transactions"),
        ])
        .sort(["customer_id", "loyalty_tier"], SortMultipleOptions::default())
        .collect()?;

    let ids = grouped.column("customer_id")?.str()?;
    let tiers = grouped.column("loyalty_tier")?.str()?;
    let sales = grouped.column("sales_amount")?.f64()?;
    let transactions = grouped.column("transactions")?.i64()?;

    Ok(ids
        .into_no_null_iter()
        .zip(tiers.into_no_null_iter())
        .zip(sales.into_no_null_iter())
        .zip(transactions.into_no_null_iter())
        .map(|(((customer_id, tier), sales_amount), transactions)| LoyaltyMember {
            customer_id: customer_id.to_string(),
            loyalty_tier: tier.to_string(),
            sales_amount,
            transactions: transactions as usize,
        })
        .collect())
}

/// Quarterly advertising budget for one category, in AED
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdBudget {
    pub category: String,
    pub budget_aed: f64,
    pub pct: f64,
}

impl AdBudget {
    /// Build budget lines with percentage shares of the overall budget
    pub fn with_shares(lines: &[(&str, f64)]) -> Vec<AdBudget> {
        let total: f64 = lines.iter().map(|(_, budget)| budget).sum();
        lines
            .iter()
            .map(|(category, budget)| AdBudget {
                category: category.to_string(),
                budget_aed: *budget,
                pct: if total > 0.0 { budget / total * 100.0 } else { 0.0 },
            })
            .collect()
    }
}

pub fn default_ad_budget() -> Vec<AdBudget> {
    AdBudget::with_shares(&[
        ("Clothing", 350_000.0),
        ("Grocery", 500_000.0),
        ("Electronics", 300_000.0),
        ("Home & Living", 150_000.0),
        ("Beauty", 100_000.0),
        ("Other", 50_000.0),
    ])
}

pub fn total_budget(budget: &[AdBudget]) -> f64 {
    budget.iter().map(|b| b.budget_aed).sum()
}

/// Budget line joined with the sales it is meant to drive
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPerformance {
    pub category: String,
    pub budget_aed: f64,
    pub sales: f64,
    /// Sales generated per AED of budget; zero without budget
    pub sales_per_aed: f64,
}

/// Match each budget line with category sales.
///
/// Categories without a budget line of their own count towards "Other" when present.
pub fn budget_vs_sales(budget: &[AdBudget], records: &[SalesRecord]) -> crate::Result<Vec<BudgetPerformance>> {
    let budgeted: HashSet<&str> = budget.iter().map(|b| b.category.as_str()).collect();
    let has_other = budgeted.contains("Other");

    let mut sales: HashMap<String, f64> = HashMap::new();
    for category in breakdown(records, Dimension::Category)? {
        let key = if budgeted.contains(category.key.as_str()) {
            category.key
        } else if has_other {
            "Other".to_string()
        } else {
            continue;
        };
        *sales.entry(key).or_insert(0.0) += category.sales;
    }

    Ok(budget
        .iter()
        .map(|line| {
            let sales = sales.get(&line.category).copied().unwrap_or(0.0);
            BudgetPerformance {
                category: line.category.clone(),
                budget_aed: line.budget_aed,
                sales,
                sales_per_aed: if line.budget_aed > 0.0 { sales / line.budget_aed } else { 0.0 },
            }
        })
        .collect())
}

/// Per-segment profile
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentStats {
    pub segment: Segment,
    pub customers: usize,
    pub share_pct: f64,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    pub total_monetary: f64,
}

/// Profile every segment, in segment order; empty segments are included with zeros
pub fn summarize_segments(customers: &[CustomerSummary]) -> Vec<SegmentStats> {
    Segment::ALL
        .iter()
        .map(|&segment| {
            let members: Vec<&CustomerSummary> =
                customers.iter().filter(|c| c.segment == segment).collect();
            let n = members.len();
            let mean = |f: fn(&CustomerSummary) -> f64| {
                if n == 0 {
                    0.0
                } else {
                    members.iter().map(|c| f(c)).sum::<f64>() / n as f64
                }
            };

            SegmentStats {
                segment,
                customers: n,
                share_pct: if customers.is_empty() {
                    0.0
                } else {
                    n as f64 / customers.len() as f64 * 100.0
                },
                avg_recency: mean(|c| c.recency as f64),
                avg_frequency: mean(|c| c.frequency as f64),
                avg_monetary: mean(|c| c.monetary),
                total_monetary: members.iter().map(|c| c.monetary).sum(),
            }
        })
        .collect()
}
