//! Command-line interface definitions and argument parsing

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::analytics::SalesFilter;
use crate::model::BinningFallback;

/// Policy for metrics whose quintile edges collapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FallbackArg {
    /// Stop with an error naming the metric
    Fail,
    /// Break ties by customer order and bin on ranks
    RankFirst,
}

impl From<FallbackArg> for BinningFallback {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Fail => BinningFallback::Fail,
            FallbackArg::RankFirst => BinningFallback::RankFirst,
        }
    }
}

/// Retail sales dashboard with RFM customer segmentation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the sales CSV file; demo data is generated when omitted
    #[arg(short, long, env = "RFMFORGE_INPUT")]
    pub input: Option<String>,

    /// Number of demo transactions to generate
    #[arg(long, default_value = "5000")]
    pub demo_rows: usize,

    /// Seed for demo data
    #[arg(long, default_value = "42", env = "RFMFORGE_SEED")]
    pub seed: u64,

    /// Write demo data to this CSV path and exit
    #[arg(long)]
    pub write_demo: Option<String>,

    /// Directory for charts and CSV exports
    #[arg(short, long, default_value = "dashboard", env = "RFMFORGE_OUTPUT_DIR")]
    pub output_dir: String,

    /// Only include sales on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only include sales on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Only include these product categories
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,

    /// Only include these locations
    #[arg(long, value_delimiter = ',')]
    pub location: Vec<String>,

    /// Only include these genders
    #[arg(long, value_delimiter = ',')]
    pub gender: Vec<String>,

    /// What to do when recency or monetary cannot be split into quintiles
    #[arg(long, value_enum, default_value = "fail")]
    pub fallback: FallbackArg,

    /// Skip invalid CSV rows instead of stopping at the first one
    #[arg(long)]
    pub skip_invalid: bool,

    /// Prediction mode: provide R,F,M values as comma-separated string
    /// Example: --predict "30,10,500.0" for Recency=30, Frequency=10, Monetary=500.0
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Skip chart generation
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_date(flag: &str, value: Option<&str>) -> crate::Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("Invalid --{} date '{}', expected YYYY-MM-DD", flag, v))
        })
        .transpose()
}

impl Args {
    /// Parse RFM values from the predict string
    /// Expected format: "recency,frequency,monetary"
    pub fn parse_rfm_values(&self) -> crate::Result<Option<[f64; 3]>> {
        let Some(ref predict_str) = self.predict else {
            return Ok(None);
        };

        let parts: Vec<&str> = predict_str.split(',').collect();
        if parts.len() != 3 {
            anyhow::bail!("Predict values must be in format 'recency,frequency,monetary'");
        }

        let mut values = [0.0; 3];
        for (slot, (name, raw)) in values
            .iter_mut()
            .zip(["recency", "frequency", "monetary"].iter().zip(parts))
        {
            *slot = raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid {} value: {}", name, raw))?;
        }

        if values[0] < 0.0 || values[1] < 0.0 {
            anyhow::bail!("Recency and frequency cannot be negative");
        }
        Ok(Some(values))
    }

    /// Build the sales filter from the date and allow-list flags
    pub fn sales_filter(&self) -> crate::Result<SalesFilter> {
        let from = parse_date("from", self.from.as_deref())?;
        let to = parse_date("to", self.to.as_deref())?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                anyhow::bail!("--from {} is after --to {}", from, to);
            }
        }

        Ok(SalesFilter {
            from,
            to,
            categories: self.category.clone(),
            locations: self.location.clone(),
            genders: self.gender.clone(),
        })
    }
}
