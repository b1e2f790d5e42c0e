//! RfmForge: retail sales analytics with RFM customer segmentation
//!
//! This library loads or synthesises sales transactions, computes descriptive
//! aggregates, scores every customer on recency, frequency and monetary value
//! by quintile, and renders the results as charts and CSV exports.

pub mod analytics;
pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod generate;
pub mod model;
pub mod quantile;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{load_sales, load_sales_file, SalesRecord};
pub use error::{Metric, SegmentError};
pub use model::{
    fit_rfm, predict_segment, segment_customers, BinningFallback, CustomerSummary, RfmModel,
    Segment, SegmentationConfig, Transaction,
};
pub use viz::generate_dashboard_charts;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
