//! RfmForge: retail sales dashboard with RFM customer segmentation
//!
//! This is the main entrypoint that orchestrates data loading, filtering,
//! descriptive analytics, segmentation, charts, exports and prediction.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use rfmforge::analytics::{
    breakdown, budget_vs_sales, compute_kpis, default_ad_budget, loyalty_summary, monthly_trend,
    summarize_segments, total_budget, Dimension,
};
use rfmforge::data::{load_sales_file, to_transactions};
use rfmforge::export::{export_to_file, write_ad_budget, write_loyalty, write_segments, write_transactions};
use rfmforge::generate::{generate_sales, DemoOptions};
use rfmforge::viz::{generate_dashboard_charts, DashboardCharts};
use rfmforge::{fit_rfm, predict_segment, Args, SalesRecord, Segment, SegmentationConfig};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        println!("RfmForge - Retail Sales Dashboard & RFM Segmentation");
        println!("====================================================\n");
    }

    if let Some(ref path) = args.write_demo {
        return write_demo_data(&args, path);
    }

    let records = load_records(&args)?;
    let filter = args.sales_filter()?;
    let records = if filter.is_empty() {
        records
    } else {
        let filtered = filter.apply(&records);
        tracing::info!(kept = filtered.len(), total = records.len(), "filter applied");
        filtered
    };
    if records.is_empty() {
        anyhow::bail!("No sales records match the selected filters");
    }

    // Check if in prediction mode
    if let Some(rfm_values) = args.parse_rfm_values()? {
        run_prediction_mode(&args, &records, rfm_values)?;
    } else {
        run_full_pipeline(&args, &records)?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn demo_options(args: &Args) -> DemoOptions {
    DemoOptions {
        rows: args.demo_rows,
        seed: args.seed,
        end_date: Local::now().date_naive(),
    }
}

fn load_records(args: &Args) -> Result<Vec<SalesRecord>> {
    let start = Instant::now();
    let records = match args.input {
        Some(ref input) => {
            tracing::info!(input = %input, "loading sales");
            let report = load_sales_file(input, args.skip_invalid)?;
            if !report.rejected.is_empty() {
                println!("! Skipped {} invalid rows", report.rejected.len());
            }
            report.records
        }
        None => {
            tracing::info!(rows = args.demo_rows, seed = args.seed, "no input given, generating demo data");
            generate_sales(&demo_options(args))?
        }
    };

    println!("✓ Data loaded: {} transactions", records.len());
    if args.verbose {
        println!("  Processing time: {:.2}s", start.elapsed().as_secs_f64());
    }
    Ok(records)
}

fn write_demo_data(args: &Args, path: &str) -> Result<()> {
    let records = generate_sales(&demo_options(args))?;
    export_to_file(Path::new(path), |file| write_transactions(file, &records))?;
    println!("✓ Demo data written: {} transactions to {}", records.len(), path);
    Ok(())
}

/// Score a single hypothetical customer against the fitted segmentation
fn run_prediction_mode(args: &Args, records: &[SalesRecord], rfm_values: [f64; 3]) -> Result<()> {
    println!("=== Prediction Mode ===");
    println!(
        "Input RFM values: R={}, F={}, M={}",
        rfm_values[0], rfm_values[1], rfm_values[2]
    );

    let start_time = Instant::now();
    let config = SegmentationConfig {
        fallback: args.fallback.into(),
    };
    let model = fit_rfm(&to_transactions(records), &config)?;
    let score = predict_segment(&model, &rfm_values)?;

    println!("\n✓ Predicted Segment: {}", score.segment);
    println!(
        "  Scores: R={} F={} M={} (total {})",
        score.r_score, score.f_score, score.m_score, score.rfm_score
    );
    println!("  Processing time: {:.2}s", start_time.elapsed().as_secs_f64());

    // Show segment context
    let sizes = model.segment_sizes();
    let size = sizes[score.segment as usize];
    let total_customers = model.customers.len();
    println!("\n{} details:", score.segment);
    println!(
        "  Size: {} customers ({:.1}% of total)",
        size,
        size as f64 / total_customers as f64 * 100.0
    );
    println!("  Reference date: {}", model.reference_date.date());

    Ok(())
}

fn print_group_table(title: &str, rows: &[rfmforge::analytics::GroupTotal]) {
    println!("\n--- {} ---", title);
    for row in rows {
        println!(
            "  {:<16} {:>12.2} AED  {:>6} tx  {:>5.1}%",
            row.key, row.sales, row.transactions, row.share_pct
        );
    }
}

/// Run the full dashboard pipeline
fn run_full_pipeline(args: &Args, records: &[SalesRecord]) -> Result<()> {
    println!("=== Sales Dashboard ===\n");
    let start_time = Instant::now();
    let output_dir = Path::new(&args.output_dir);

    // Step 1: KPIs and breakdowns
    let kpis = compute_kpis(records);
    println!("Total sales:          {:.2} AED", kpis.total_sales);
    println!("Transactions:         {}", kpis.transactions);
    println!("Unique customers:     {}", kpis.unique_customers);
    println!("Avg transaction:      {:.2} AED", kpis.avg_transaction_value);
    println!("Items sold:           {}", kpis.total_items);
    if let (Some(first), Some(last)) = (kpis.first_date, kpis.last_date) {
        println!("Period:               {} to {}", first, last);
    }

    let categories = breakdown(records, Dimension::Category)?;
    print_group_table("Sales by category", &categories);
    for dimension in [Dimension::Gender, Dimension::AgeBand, Dimension::Location] {
        let title = format!("Sales by {}", dimension.to_string().to_lowercase());
        print_group_table(&title, &breakdown(records, dimension)?);
    }
    let months = monthly_trend(records)?;
    print_group_table("Monthly trend", &months);

    // Step 2: Advertising budget
    let budget = default_ad_budget();
    println!("\n--- Advertising budget (total {:.0} AED) ---", total_budget(&budget));
    for line in budget_vs_sales(&budget, records)? {
        println!(
            "  {:<16} {:>10.0} AED  sales {:>12.2}  ({:.2} per AED)",
            line.category, line.budget_aed, line.sales, line.sales_per_aed
        );
    }

    // Step 3: Segmentation
    let config = SegmentationConfig {
        fallback: args.fallback.into(),
    };
    let segment_start = Instant::now();
    let model = fit_rfm(&to_transactions(records), &config)?;
    println!("\n✓ Customers segmented: {}", model.customers.len());
    if args.verbose {
        println!("  Reference date: {}", model.reference_date);
        println!("  Segmentation time: {:.2}s", segment_start.elapsed().as_secs_f64());
    }

    println!("\n=== Segment Statistics ===");
    println!("  Segment    | Customers |  Share | Recency | Frequency |   Monetary");
    println!("  -----------|-----------|--------|---------|-----------|-----------");
    for stats in summarize_segments(&model.customers) {
        println!(
            "  {:<10} | {:>9} | {:>5.1}% | {:>7.1} | {:>9.2} | {:>10.2}",
            stats.segment,
            stats.customers,
            stats.share_pct,
            stats.avg_recency,
            stats.avg_frequency,
            stats.avg_monetary
        );
    }

    // Step 4: Charts
    if !args.no_charts {
        let charts = DashboardCharts {
            categories: &categories,
            months: &months,
            customers: &model.customers,
            segment_sizes: model.segment_sizes(),
        };
        let paths = generate_dashboard_charts(&charts, output_dir)?;
        println!("\n✓ Charts generated: {}", paths.len());
        for path in &paths {
            println!("  {}", path.display());
        }
    }

    // Step 5: Exports
    let members = loyalty_summary(records)?;
    export_to_file(&output_dir.join("segments.csv"), |file| write_segments(file, &model.customers))?;
    export_to_file(&output_dir.join("loyalty_members.csv"), |file| write_loyalty(file, &members))?;
    export_to_file(&output_dir.join("ad_budget.csv"), |file| write_ad_budget(file, &budget))?;
    let champions = model
        .customers
        .iter()
        .filter(|c| c.segment == Segment::Champions)
        .count();
    println!("\n✓ Exports written to {}", output_dir.display());
    println!("  Suggested loyalty targets (Champions): {}", champions);

    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}
