//! Typed errors for ingestion and segmentation

use std::fmt;

use polars::prelude::PolarsError;
use thiserror::Error;

/// One of the three RFM metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Recency,
    Frequency,
    Monetary,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Recency => "recency",
            Metric::Frequency => "frequency",
            Metric::Monetary => "monetary",
        };
        f.write_str(name)
    }
}

/// Failures surfaced by ingestion and the segmentation engine
#[derive(Debug, Error, PartialEq)]
pub enum SegmentError {
    #[error("no transactions supplied")]
    EmptyInput,

    /// `record` is the 1-based CSV line, or the 1-based position in the engine input
    #[error("invalid record {record}: {field}: {reason}")]
    InvalidRecord {
        record: usize,
        field: &'static str,
        reason: String,
    },

    #[error(
        "cannot split {metric} into {bins} quantile bins: edges are not unique ({distinct} distinct values)"
    )]
    InsufficientDistinctValues {
        metric: Metric,
        distinct: usize,
        bins: usize,
    },

    #[error("rfm score {0} does not fall into any segment")]
    UnmappedScore(u8),

    /// A dataframe operation failed; the message is kept so the error stays comparable
    #[error("dataframe operation failed: {0}")]
    Frame(String),
}

impl From<PolarsError> for SegmentError {
    fn from(err: PolarsError) -> Self {
        SegmentError::Frame(err.to_string())
    }
}

pub type SegmentResult<T> = std::result::Result<T, SegmentError>;
