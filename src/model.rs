//! RFM segmentation engine
//!
//! Customers are aggregated from raw transactions, each metric is split into
//! quintiles across the whole customer base, and the summed score is mapped
//! onto one of four value segments.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

use crate::error::{Metric, SegmentError, SegmentResult};
use crate::quantile::{
    bin_index, distinct_count, edges_are_unique, quantile_edges, rank_first, sorted_values,
};

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Number of score levels per metric
pub const SCORE_LEVELS: usize = 5;

/// A single purchase event, the minimal input to segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub customer_id: String,
    pub timestamp: NaiveDateTime,
    /// Refunds may be negative and are summed as-is
    pub amount: f64,
}

impl Transaction {
    pub fn new(customer_id: impl Into<String>, timestamp: NaiveDateTime, amount: f64) -> Self {
        Self {
            customer_id: customer_id.into(),
            timestamp,
            amount,
        }
    }
}

/// Named customer value segment, ordered from lowest to highest value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Segment {
    #[serde(rename = "Low Value")]
    LowValue,
    #[serde(rename = "Mid Value")]
    MidValue,
    #[serde(rename = "High Value")]
    HighValue,
    #[serde(rename = "Champions")]
    Champions,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::LowValue,
        Segment::MidValue,
        Segment::HighValue,
        Segment::Champions,
    ];

    /// Map a combined score onto its segment.
    ///
    /// Bins are (0,5], (5,9], (9,12] and (12,15]; anything else is unmapped.
    pub fn from_rfm_score(score: u8) -> Option<Segment> {
        match score {
            1..=5 => Some(Segment::LowValue),
            6..=9 => Some(Segment::MidValue),
            10..=12 => Some(Segment::HighValue),
            13..=15 => Some(Segment::Champions),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::LowValue => "Low Value",
            Segment::MidValue => "Mid Value",
            Segment::HighValue => "High Value",
            Segment::Champions => "Champions",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived per-customer RFM values, scores and segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    /// Days between the reference date and the latest purchase
    pub recency: i64,
    pub frequency: usize,
    pub monetary: f64,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    pub rfm_score: u8,
    pub segment: Segment,
}

impl CustomerSummary {
    /// The three scores as digits in recency, frequency, monetary order, e.g. "533"
    pub fn rfm_segment_code(&self) -> String {
        format!("{}{}{}", self.r_score, self.f_score, self.m_score)
    }
}

/// What to do when a metric's quantile edges collapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinningFallback {
    /// Report `InsufficientDistinctValues`
    #[default]
    Fail,
    /// Re-bin the metric on rank-first positions, as frequency always is
    RankFirst,
}

/// Engine options
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentationConfig {
    /// Applies to recency and monetary; frequency is always rank-binned
    pub fallback: BinningFallback,
}

/// Fitted quintile edges for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBins {
    pub metric: Metric,
    pub edges: Vec<f64>,
    /// Sorted raw values when the edges were computed over ranks
    ranked_values: Option<Vec<f64>>,
}

impl MetricBins {
    /// Fit edges over `values`, either on the raw values or their rank-first positions
    fn fit(metric: Metric, values: &[f64], by_rank: bool) -> SegmentResult<Self> {
        let binned = if by_rank { rank_first(values)? } else { values.to_vec() };
        let edges = quantile_edges(&binned, SCORE_LEVELS)?;

        if !edges_are_unique(&edges) {
            return Err(SegmentError::InsufficientDistinctValues {
                metric,
                distinct: distinct_count(&binned)?,
                bins: SCORE_LEVELS,
            });
        }

        let ranked_values = by_rank.then(|| sorted_values(values));

        Ok(Self {
            metric,
            edges,
            ranked_values,
        })
    }

    pub fn is_rank_based(&self) -> bool {
        self.ranked_values.is_some()
    }

    /// Zero-based quintile of a fitted customer, given its binned value
    fn quintile_of_binned(&self, binned: f64) -> usize {
        bin_index(&self.edges, binned)
    }

    /// Zero-based quintile for a value that was not part of the fit.
    ///
    /// On rank-binned metrics a value tied with fitted customers takes the
    /// lowest rank among them.
    fn quintile_of_new(&self, value: f64) -> usize {
        match &self.ranked_values {
            Some(sorted) => {
                let below = sorted.partition_point(|&v| v < value);
                let rank = (below + 1).min(sorted.len());
                bin_index(&self.edges, rank as f64)
            }
            None => bin_index(&self.edges, value),
        }
    }
}

/// Score of a hypothetical customer against a fitted model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfmScore {
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    pub rfm_score: u8,
    pub segment: Segment,
}

/// Result of fitting the engine on a transaction set
#[derive(Debug, Clone)]
pub struct RfmModel {
    /// One summary per customer, sorted by customer id
    pub customers: Vec<CustomerSummary>,
    /// Latest transaction timestamp plus one day
    pub reference_date: NaiveDateTime,
    pub recency_bins: MetricBins,
    pub frequency_bins: MetricBins,
    pub monetary_bins: MetricBins,
}

impl RfmModel {
    /// Score a customer that was not part of the fit
    pub fn predict(&self, recency: f64, frequency: f64, monetary: f64) -> SegmentResult<RfmScore> {
        let r_score = descending_score(self.recency_bins.quintile_of_new(recency));
        let f_score = ascending_score(self.frequency_bins.quintile_of_new(frequency));
        let m_score = ascending_score(self.monetary_bins.quintile_of_new(monetary));
        let rfm_score = r_score + f_score + m_score;
        let segment = Segment::from_rfm_score(rfm_score).ok_or(SegmentError::UnmappedScore(rfm_score))?;

        Ok(RfmScore {
            r_score,
            f_score,
            m_score,
            rfm_score,
            segment,
        })
    }

    /// Customer count per segment, in `Segment::ALL` order
    pub fn segment_sizes(&self) -> [usize; 4] {
        let mut sizes = [0; 4];
        for customer in &self.customers {
            sizes[customer.segment as usize] += 1;
        }
        sizes
    }
}

struct CustomerMetrics {
    customer_id: String,
    recency: i64,
    frequency: usize,
    monetary: f64,
}

/// Reject records the aggregation cannot use, reporting their 1-based position
fn validate_transactions(transactions: &[Transaction]) -> SegmentResult<()> {
    for (position, transaction) in transactions.iter().enumerate() {
        if transaction.customer_id.trim().is_empty() {
            return Err(SegmentError::InvalidRecord {
                record: position + 1,
                field: "customer_id",
                reason: "customer id is empty".to_string(),
            });
        }
        if !transaction.amount.is_finite() {
            return Err(SegmentError::InvalidRecord {
                record: position + 1,
                field: "amount",
                reason: format!("amount {} is not finite", transaction.amount),
            });
        }
    }
    Ok(())
}

/// Latest transaction timestamp plus one day
fn reference_date(transactions: &[Transaction]) -> SegmentResult<NaiveDateTime> {
    let (position, latest) = transactions
        .iter()
        .enumerate()
        .max_by_key(|(_, t)| t.timestamp)
        .ok_or(SegmentError::EmptyInput)?;

    latest
        .timestamp
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| SegmentError::InvalidRecord {
            record: position + 1,
            field: "timestamp",
            reason: format!("{} leaves no room for a reference date", latest.timestamp),
        })
}

fn transaction_frame(transactions: &[Transaction]) -> PolarsResult<DataFrame> {
    let ids: Vec<&str> = transactions.iter().map(|t| t.customer_id.as_str()).collect();
    let timestamps: Vec<i64> = transactions
        .iter()
        .map(|t| t.timestamp.and_utc().timestamp_micros())
        .collect();
    let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();

    DataFrame::new(vec![
        Column::new("customer_id".into(), ids),
        Column::new("timestamp".into(), timestamps),
        Column::new("amount".into(), amounts),
    ])
}

/// Group transactions per customer and compute raw recency, frequency and monetary
fn aggregate(transactions: &[Transaction]) -> SegmentResult<(NaiveDateTime, Vec<CustomerMetrics>)> {
    validate_transactions(transactions)?;
    let reference_date = reference_date(transactions)?;
    let reference_micros = reference_date.and_utc().timestamp_micros();

    let rfm_df = transaction_frame(transactions)?
        .lazy()
        .group_by([col("customer_id")])
        .agg([
            col("timestamp").max().alias("last_purchase"),
            len().cast(DataType::Int64).alias("frequency"),
            col("amount").sum().alias("monetary"),
        ])
        .sort(["customer_id"], SortMultipleOptions::default())
        .collect()?;

    let ids = rfm_df.column("customer_id")?.str()?;
    let last_purchase = rfm_df.column("last_purchase")?.i64()?;
    let frequency = rfm_df.column("frequency")?.i64()?;
    let monetary = rfm_df.column("monetary")?.f64()?;

    let customers = ids
        .into_no_null_iter()
        .zip(last_purchase.into_no_null_iter())
        .zip(frequency.into_no_null_iter())
        .zip(monetary.into_no_null_iter())
        .map(|(((customer_id, last), frequency), monetary)| CustomerMetrics {
            customer_id: customer_id.to_string(),
            recency: (reference_micros - last) / MICROS_PER_DAY,
            frequency: frequency as usize,
            monetary,
        })
        .collect();

    Ok((reference_date, customers))
}

fn ascending_score(quintile: usize) -> u8 {
    (quintile + 1) as u8
}

fn descending_score(quintile: usize) -> u8 {
    (SCORE_LEVELS - quintile) as u8
}

/// Fit bins for one metric, applying the configured fallback on collapsed edges
fn fit_metric(
    metric: Metric,
    values: &[f64],
    config: &SegmentationConfig,
) -> SegmentResult<(MetricBins, Vec<usize>)> {
    let by_rank = metric == Metric::Frequency;
    let bins = match MetricBins::fit(metric, values, by_rank) {
        Err(SegmentError::InsufficientDistinctValues { distinct, .. })
            if !by_rank && config.fallback == BinningFallback::RankFirst =>
        {
            tracing::debug!(%metric, distinct, "quantile edges collapsed, binning on ranks");
            MetricBins::fit(metric, values, true)?
        }
        other => other?,
    };

    let binned = if bins.is_rank_based() { rank_first(values)? } else { values.to_vec() };
    let quintiles = binned.iter().map(|&v| bins.quintile_of_binned(v)).collect();
    Ok((bins, quintiles))
}

/// Fit the RFM model on a transaction set
///
/// # Arguments
/// * `transactions` - Non-empty set of purchases
/// * `config` - Fallback policy for metrics whose quintile edges collapse
///
/// # Returns
/// * Fitted `RfmModel` holding every customer's summary and the bin edges
pub fn fit_rfm(transactions: &[Transaction], config: &SegmentationConfig) -> SegmentResult<RfmModel> {
    let (reference_date, metrics) = aggregate(transactions)?;
    tracing::debug!(
        transactions = transactions.len(),
        customers = metrics.len(),
        %reference_date,
        "aggregated customers"
    );

    let recency: Vec<f64> = metrics.iter().map(|c| c.recency as f64).collect();
    let frequency: Vec<f64> = metrics.iter().map(|c| c.frequency as f64).collect();
    let monetary: Vec<f64> = metrics.iter().map(|c| c.monetary).collect();

    // All edges are fixed before any customer is scored
    let (recency_bins, r_quintiles) = fit_metric(Metric::Recency, &recency, config)?;
    let (frequency_bins, f_quintiles) = fit_metric(Metric::Frequency, &frequency, config)?;
    let (monetary_bins, m_quintiles) = fit_metric(Metric::Monetary, &monetary, config)?;

    let mut customers = Vec::with_capacity(metrics.len());
    for (i, m) in metrics.into_iter().enumerate() {
        let r_score = descending_score(r_quintiles[i]);
        let f_score = ascending_score(f_quintiles[i]);
        let m_score = ascending_score(m_quintiles[i]);
        let rfm_score = r_score + f_score + m_score;
        let segment = Segment::from_rfm_score(rfm_score).ok_or(SegmentError::UnmappedScore(rfm_score))?;

        customers.push(CustomerSummary {
            customer_id: m.customer_id,
            recency: m.recency,
            frequency: m.frequency,
            monetary: m.monetary,
            r_score,
            f_score,
            m_score,
            rfm_score,
            segment,
        });
    }

    Ok(RfmModel {
        customers,
        reference_date,
        recency_bins,
        frequency_bins,
        monetary_bins,
    })
}

/// Segment every customer present in `transactions`
///
/// Output is sorted by customer id.
pub fn segment_customers(
    transactions: &[Transaction],
    config: &SegmentationConfig,
) -> SegmentResult<Vec<CustomerSummary>> {
    fit_rfm(transactions, config).map(|model| model.customers)
}

/// Score hypothetical RFM values against a fitted model
pub fn predict_segment(model: &RfmModel, rfm_values: &[f64; 3]) -> SegmentResult<RfmScore> {
    model.predict(rfm_values[0], rfm_values[1], rfm_values[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn day(n: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + Duration::days(n)
    }

    /// Reference date lands on day 101: A last bought 2 days before, C 10, B 100
    fn scenario() -> Vec<Transaction> {
        let mut txs = Vec::new();
        for n in [40, 60, 80, 95, 99] {
            txs.push(Transaction::new("A", day(n), 200.0));
        }
        txs.push(Transaction::new("B", day(1), 50.0));
        txs.push(Transaction::new("C", day(50), 100.0));
        txs.push(Transaction::new("C", day(70), 150.0));
        txs.push(Transaction::new("C", day(91), 250.0));
        // Latest overall transaction defines the reference date
        txs.push(Transaction::new("D", day(100), 60.0));
        txs
    }

    fn find<'a>(customers: &'a [CustomerSummary], id: &str) -> &'a CustomerSummary {
        customers.iter().find(|c| c.customer_id == id).unwrap()
    }

    #[test]
    fn test_three_customer_scores() {
        let txs = vec![
            Transaction::new("A", day(0), 200.0),
            Transaction::new("A", day(10), 200.0),
            Transaction::new("A", day(20), 200.0),
            Transaction::new("A", day(30), 200.0),
            Transaction::new("A", day(98), 200.0),
            Transaction::new("B", day(0), 50.0),
            Transaction::new("C", day(40), 100.0),
            Transaction::new("C", day(60), 150.0),
            Transaction::new("C", day(90), 250.0),
        ];
        let model = fit_rfm(&txs, &SegmentationConfig::default()).unwrap();
        let customers = &model.customers;

        // Reference is day 99
        assert_eq!(model.reference_date, day(99));
        let a = find(customers, "A");
        let b = find(customers, "B");
        let c = find(customers, "C");
        assert_eq!((a.recency, a.frequency), (1, 5));
        assert_eq!((b.recency, b.frequency), (99, 1));
        assert_eq!((c.recency, c.frequency), (9, 3));

        assert_eq!((a.r_score, a.f_score, a.m_score), (5, 5, 5));
        assert_eq!((b.r_score, b.f_score, b.m_score), (1, 1, 1));
        assert_eq!((c.r_score, c.f_score, c.m_score), (3, 3, 3));
        assert_eq!(a.segment, Segment::Champions);
        assert_eq!(b.segment, Segment::LowValue);
        assert_eq!(c.segment, Segment::MidValue);
        assert_eq!(a.rfm_segment_code(), "555");
    }

    #[test]
    fn test_scenario_properties() {
        let txs = scenario();
        let customers = segment_customers(&txs, &SegmentationConfig::default()).unwrap();

        let input_ids: HashSet<&str> = txs.iter().map(|t| t.customer_id.as_str()).collect();
        let output_ids: HashSet<&str> = customers.iter().map(|c| c.customer_id.as_str()).collect();
        assert_eq!(input_ids, output_ids);
        assert_eq!(customers.len(), 4);

        let a = find(&customers, "A");
        let b = find(&customers, "B");
        assert_eq!(a.frequency, 5);
        assert!((a.monetary - 1000.0).abs() < 1e-9);
        assert_eq!(a.recency, 2);
        assert_eq!(b.recency, 100);
        assert!(matches!(a.segment, Segment::Champions | Segment::HighValue));
        assert_eq!(b.segment, Segment::LowValue);
        assert_eq!(b.r_score, 1);
        assert_eq!(b.m_score, 1);

        for c in &customers {
            assert!((3..=15).contains(&c.rfm_score));
            assert_eq!(c.rfm_score, c.r_score + c.f_score + c.m_score);
            assert!(c.recency >= 1);
        }
    }

    #[test]
    fn test_output_sorted_by_customer_id() {
        let customers = segment_customers(&scenario(), &SegmentationConfig::default()).unwrap();
        let ids: Vec<&str> = customers.iter().map(|c| c.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_empty_input() {
        let result = segment_customers(&[], &SegmentationConfig::default());
        assert_eq!(result, Err(SegmentError::EmptyInput));
    }

    #[test]
    fn test_identical_frequency_splits_evenly() {
        let txs: Vec<Transaction> = (0..10)
            .map(|i| Transaction::new(format!("C{:02}", i), day(i), 10.0 * (i + 1) as f64))
            .collect();
        let customers = segment_customers(&txs, &SegmentationConfig::default()).unwrap();

        let mut per_score = [0usize; 5];
        for c in &customers {
            assert_eq!(c.frequency, 1);
            per_score[(c.f_score - 1) as usize] += 1;
        }
        assert_eq!(per_score, [2, 2, 2, 2, 2]);

        // Ties resolve by customer id
        assert_eq!(find(&customers, "C00").f_score, 1);
        assert_eq!(find(&customers, "C09").f_score, 5);
    }

    #[test]
    fn test_collapsed_recency_edges_fail_by_default() {
        let mut txs: Vec<Transaction> = (0..5)
            .map(|i| Transaction::new(format!("C{}", i), day(100), 10.0 + i as f64))
            .collect();
        txs.push(Transaction::new("C5", day(90), 99.0));

        let err = segment_customers(&txs, &SegmentationConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SegmentError::InsufficientDistinctValues {
                metric: Metric::Recency,
                distinct: 2,
                bins: 5,
            }
        );
    }

    #[test]
    fn test_rank_first_fallback_recovers() {
        let mut txs: Vec<Transaction> = (0..5)
            .map(|i| Transaction::new(format!("C{}", i), day(100), 10.0 + i as f64))
            .collect();
        txs.push(Transaction::new("C5", day(90), 99.0));

        let config = SegmentationConfig {
            fallback: BinningFallback::RankFirst,
        };
        let model = fit_rfm(&txs, &config).unwrap();
        assert!(model.recency_bins.is_rank_based());
        assert!(!model.monetary_bins.is_rank_based());

        // The one stale customer has the largest recency and scores lowest
        let stale = find(&model.customers, "C5");
        assert_eq!(stale.recency, 11);
        assert_eq!(stale.r_score, 1);
        for c in &model.customers {
            assert!((1..=5).contains(&c.r_score));
        }
    }

    #[test]
    fn test_single_customer_cannot_be_binned() {
        let txs = vec![Transaction::new("solo", day(0), 10.0)];
        for fallback in [BinningFallback::Fail, BinningFallback::RankFirst] {
            let result = segment_customers(&txs, &SegmentationConfig { fallback });
            assert!(matches!(
                result,
                Err(SegmentError::InsufficientDistinctValues { .. })
            ));
        }
    }

    #[test]
    fn test_negative_amounts_are_summed() {
        let mut txs = scenario();
        txs.push(Transaction::new("A", day(30), -300.0));
        let customers = segment_customers(&txs, &SegmentationConfig::default()).unwrap();
        let a = find(&customers, "A");
        assert!((a.monetary - 700.0).abs() < 1e-9);
        assert_eq!(a.frequency, 6);
    }

    #[test]
    fn test_invalid_engine_input() {
        let mut txs = scenario();
        txs.push(Transaction::new("E", day(5), f64::NAN));
        let err = segment_customers(&txs, &SegmentationConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::InvalidRecord { record: 11, field: "amount", .. }
        ));

        let txs = vec![Transaction::new("  ", day(0), 1.0)];
        let err = segment_customers(&txs, &SegmentationConfig::default()).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidRecord { field: "customer_id", .. }));
    }

    #[test]
    fn test_reference_date_overflow_is_invalid_record() {
        let txs = vec![
            Transaction::new("A", day(0), 5.0),
            Transaction::new("B", NaiveDateTime::MAX, 10.0),
        ];
        let err = segment_customers(&txs, &SegmentationConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::InvalidRecord { record: 2, field: "timestamp", .. }
        ));
    }

    #[test]
    fn test_predict_tied_frequency_takes_lowest_rank() {
        // Eight one-off buyers, then C08 with two purchases and C09 with three
        let mut txs: Vec<Transaction> = (0..10)
            .map(|i| Transaction::new(format!("C{:02}", i), day(i * 5), 10.0 * (i + 1) as f64))
            .collect();
        txs.push(Transaction::new("C08", day(41), 1.0));
        txs.push(Transaction::new("C09", day(46), 1.0));
        txs.push(Transaction::new("C09", day(47), 1.0));
        let model = fit_rfm(&txs, &SegmentationConfig::default()).unwrap();

        let one_off: Vec<u8> = model
            .customers
            .iter()
            .filter(|c| c.frequency == 1)
            .map(|c| c.f_score)
            .collect();
        assert_eq!(one_off.len(), 8);
        assert_eq!(one_off.iter().min(), Some(&1));

        let predicted = predict_segment(&model, &[10.0, 1.0, 50.0]).unwrap();
        assert_eq!(predicted.f_score, 1);
        let predicted = predict_segment(&model, &[10.0, 2.0, 50.0]).unwrap();
        assert_eq!(predicted.f_score, 5);
        let predicted = predict_segment(&model, &[10.0, 40.0, 50.0]).unwrap();
        assert_eq!(predicted.f_score, 5);
    }

    #[test]
    fn test_idempotent() {
        let txs = scenario();
        let first = segment_customers(&txs, &SegmentationConfig::default()).unwrap();
        let second = segment_customers(&txs, &SegmentationConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_recency_monotonic() {
        // Twenty customers with identical frequency and monetary, spread over time
        let txs: Vec<Transaction> = (0..20)
            .map(|i| Transaction::new(format!("C{:02}", i), day(i * 3), 100.0))
            .collect();
        let config = SegmentationConfig {
            fallback: BinningFallback::RankFirst,
        };
        let mut customers = segment_customers(&txs, &config).unwrap();
        customers.sort_by_key(|c| c.recency);
        for pair in customers.windows(2) {
            assert!(pair[0].r_score >= pair[1].r_score);
        }
    }

    #[test]
    fn test_segment_boundaries() {
        assert_eq!(Segment::from_rfm_score(0), None);
        assert_eq!(Segment::from_rfm_score(3), Some(Segment::LowValue));
        assert_eq!(Segment::from_rfm_score(5), Some(Segment::LowValue));
        assert_eq!(Segment::from_rfm_score(6), Some(Segment::MidValue));
        assert_eq!(Segment::from_rfm_score(9), Some(Segment::MidValue));
        assert_eq!(Segment::from_rfm_score(10), Some(Segment::HighValue));
        assert_eq!(Segment::from_rfm_score(12), Some(Segment::HighValue));
        assert_eq!(Segment::from_rfm_score(13), Some(Segment::Champions));
        assert_eq!(Segment::from_rfm_score(15), Some(Segment::Champions));
        assert_eq!(Segment::from_rfm_score(16), None);
        for score in 3..=15 {
            assert!(Segment::from_rfm_score(score).is_some());
        }
    }

    #[test]
    fn test_predict_segment() {
        let txs = vec![
            Transaction::new("A", day(0), 200.0),
            Transaction::new("A", day(10), 200.0),
            Transaction::new("A", day(20), 200.0),
            Transaction::new("A", day(30), 200.0),
            Transaction::new("A", day(98), 200.0),
            Transaction::new("B", day(0), 50.0),
            Transaction::new("C", day(40), 100.0),
            Transaction::new("C", day(60), 150.0),
            Transaction::new("C", day(90), 250.0),
        ];
        let model = fit_rfm(&txs, &SegmentationConfig::default()).unwrap();

        let best = predict_segment(&model, &[1.0, 10.0, 5000.0]).unwrap();
        assert_eq!((best.r_score, best.f_score, best.m_score), (5, 5, 5));
        assert_eq!(best.segment, Segment::Champions);

        let worst = predict_segment(&model, &[365.0, 1.0, 0.0]).unwrap();
        assert_eq!((worst.r_score, worst.f_score, worst.m_score), (1, 1, 1));
        assert_eq!(worst.segment, Segment::LowValue);

        // Same values as customer C reproduce its scores
        let like_c = predict_segment(&model, &[9.0, 3.0, 500.0]).unwrap();
        assert_eq!((like_c.r_score, like_c.f_score, like_c.m_score), (3, 3, 3));
    }

    #[test]
    fn test_segment_sizes() {
        let model = fit_rfm(&scenario(), &SegmentationConfig::default()).unwrap();
        let sizes = model.segment_sizes();
        assert_eq!(sizes.iter().sum::<usize>(), model.customers.len());
    }
}
