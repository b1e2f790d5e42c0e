//! Dashboard charts rendered to SVG with Plotters

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use plotters::prelude::*;

use crate::analytics::GroupTotal;
use crate::model::{CustomerSummary, Segment};

/// Colour per segment, in `Segment::ALL` order
const SEGMENT_COLORS: [RGBColor; 4] = [
    RGBColor(214, 39, 40),
    RGBColor(255, 127, 14),
    RGBColor(31, 119, 180),
    RGBColor(44, 160, 44),
];

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

fn segment_color(segment: Segment) -> RGBColor {
    SEGMENT_COLORS[segment as usize]
}

fn axis_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

/// Y range covering zero and every value, padded above by a fraction of the span
fn padded_range(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let low = values.clone().fold(f64::INFINITY, f64::min).min(0.0);
    let high = values.fold(f64::NEG_INFINITY, f64::max).max(low + 1.0);
    (low, high + (high - low) * 0.05)
}

/// Vertical bar chart of labelled values
fn draw_bar_chart(
    output_path: &Path,
    title: &str,
    y_desc: &str,
    bars: &[(String, f64)],
    colors: &[RGBColor],
) -> crate::Result<()> {
    if bars.is_empty() {
        anyhow::bail!("Nothing to plot for '{}'", title);
    }

    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
    let max_value = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

    let root = SVGBackend::new(output_path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..bars.len() as i32).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&|v| axis_label(&labels, v))
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        let color = colors.get(i % colors.len().max(1)).copied().unwrap_or(BAR_COLOR);
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i as i32), 0.0),
                (SegmentValue::Exact(i as i32 + 1), *value),
            ],
            color.filled(),
        );
        bar.set_margin(0, 0, 8, 8);
        bar
    }))?;

    root.present()?;
    Ok(())
}

/// Bar chart of sales per category
pub fn create_category_sales_chart(categories: &[GroupTotal], output_path: &Path) -> crate::Result<()> {
    let bars: Vec<(String, f64)> = categories.iter().map(|c| (c.key.clone(), c.sales)).collect();
    draw_bar_chart(output_path, "Sales by Category", "Sales (AED)", &bars, &[BAR_COLOR])?;
    tracing::debug!(path = %output_path.display(), "category chart written");
    Ok(())
}

/// Line chart of sales per month
pub fn create_monthly_trend_chart(months: &[GroupTotal], output_path: &Path) -> crate::Result<()> {
    if months.is_empty() {
        anyhow::bail!("Nothing to plot for the monthly trend");
    }

    let labels: Vec<String> = months.iter().map(|m| m.key.clone()).collect();
    let max_sales = months.iter().map(|m| m.sales).fold(0.0_f64, f64::max);
    let y_max = if max_sales > 0.0 { max_sales * 1.1 } else { 1.0 };

    let root = SVGBackend::new(output_path, (900, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Sales Trend", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..months.len() as i32).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|v| axis_label(&labels, v))
        .x_desc("Month")
        .y_desc("Sales (AED)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let points: Vec<(SegmentValue<i32>, f64)> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (SegmentValue::CenterOf(i as i32), m.sales))
        .collect();

    chart.draw_series(LineSeries::new(points.clone(), BAR_COLOR.stroke_width(2)))?;
    chart.draw_series(
        points
            .into_iter()
            .map(|point| Circle::new(point, 4, BAR_COLOR.filled())),
    )?;

    root.present()?;
    tracing::debug!(path = %output_path.display(), "monthly trend chart written");
    Ok(())
}

/// Bar chart of customers per segment
pub fn create_segment_size_chart(segment_sizes: &[usize; 4], output_path: &Path) -> crate::Result<()> {
    let bars: Vec<(String, f64)> = Segment::ALL
        .iter()
        .zip(segment_sizes)
        .map(|(segment, &size)| (segment.label().to_string(), size as f64))
        .collect();
    draw_bar_chart(
        output_path,
        "Customers per Segment",
        "Customers",
        &bars,
        &SEGMENT_COLORS,
    )?;
    tracing::debug!(path = %output_path.display(), "segment size chart written");
    Ok(())
}

/// Scatter plot of frequency against monetary value, coloured by segment
pub fn create_segment_scatter(customers: &[CustomerSummary], output_path: &Path) -> crate::Result<()> {
    if customers.is_empty() {
        anyhow::bail!("No customers to plot");
    }

    let freq_max = customers.iter().map(|c| c.frequency).max().unwrap_or(1) as f64;
    let (mon_low, mon_high) = padded_range(customers.iter().map(|c| c.monetary));

    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Customer Segments: Frequency vs Monetary", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..(freq_max + 1.0), mon_low..mon_high)?;

    chart
        .configure_mesh()
        .x_desc("Frequency (transactions)")
        .y_desc("Monetary (AED)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for segment in Segment::ALL {
        let color = segment_color(segment);
        let points: Vec<(f64, f64)> = customers
            .iter()
            .filter(|c| c.segment == segment)
            .map(|c| (c.frequency as f64, c.monetary))
            .collect();
        if points.is_empty() {
            continue;
        }

        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.mix(0.7).filled())))?
            .label(segment.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::debug!(path = %output_path.display(), "segment scatter written");
    Ok(())
}

/// Inputs for the full chart set
pub struct DashboardCharts<'a> {
    pub categories: &'a [GroupTotal],
    pub months: &'a [GroupTotal],
    pub customers: &'a [CustomerSummary],
    pub segment_sizes: [usize; 4],
}

/// Write every dashboard chart into `output_dir`, returning the file paths
pub fn generate_dashboard_charts(charts: &DashboardCharts<'_>, output_dir: &Path) -> crate::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create '{}'", output_dir.display()))?;

    let category_path = output_dir.join("category_sales.svg");
    create_category_sales_chart(charts.categories, &category_path)?;

    let trend_path = output_dir.join("monthly_trend.svg");
    create_monthly_trend_chart(charts.months, &trend_path)?;

    let sizes_path = output_dir.join("segment_sizes.svg");
    create_segment_size_chart(&charts.segment_sizes, &sizes_path)?;

    let scatter_path = output_dir.join("segment_scatter.svg");
    create_segment_scatter(charts.customers, &scatter_path)?;

    Ok(vec![category_path, trend_path, sizes_path, scatter_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn totals(keys: &[(&str, f64)]) -> Vec<GroupTotal> {
        keys.iter()
            .map(|(key, sales)| GroupTotal {
                key: key.to_string(),
                sales: *sales,
                transactions: 1,
                share_pct: 0.0,
            })
            .collect()
    }

    fn customer(id: &str, frequency: usize, monetary: f64, segment: Segment) -> CustomerSummary {
        CustomerSummary {
            customer_id: id.to_string(),
            recency: 5,
            frequency,
            monetary,
            r_score: 3,
            f_score: 3,
            m_score: 3,
            rfm_score: 9,
            segment,
        }
    }

    #[test]
    fn test_create_category_sales_chart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("categories.svg");
        create_category_sales_chart(&totals(&[("Grocery", 500.0), ("Toys", 120.0)]), &path).unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Sales by Category"));
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let dir = tempdir().unwrap();
        assert!(create_category_sales_chart(&[], &dir.path().join("a.svg")).is_err());
        assert!(create_monthly_trend_chart(&[], &dir.path().join("b.svg")).is_err());
        assert!(create_segment_scatter(&[], &dir.path().join("c.svg")).is_err());
    }

    #[test]
    fn test_monetary_range_with_only_refunds() {
        let (low, high) = padded_range([-50.0, -20.0].into_iter());
        assert!(low <= -50.0);
        assert!(high > -20.0);
        assert!(low < high);

        let (low, high) = padded_range([0.0, 200.0].into_iter());
        assert_eq!(low, 0.0);
        assert!((high - 210.0).abs() < 1e-9);

        let dir = tempdir().unwrap();
        let customers = vec![
            customer("A", 2, -50.0, Segment::LowValue),
            customer("B", 1, -20.0, Segment::LowValue),
        ];
        let path = dir.path().join("refunds.svg");
        create_segment_scatter(&customers, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_generate_dashboard_charts() {
        let dir = tempdir().unwrap();
        let categories = totals(&[("Grocery", 500.0), ("Electronics", 1500.0)]);
        let months = totals(&[("2025-01", 800.0), ("2025-02", 1200.0)]);
        let customers = vec![
            customer("A", 5, 1000.0, Segment::Champions),
            customer("B", 1, 50.0, Segment::LowValue),
            customer("C", 3, -20.0, Segment::MidValue),
        ];
        let charts = DashboardCharts {
            categories: &categories,
            months: &months,
            customers: &customers,
            segment_sizes: [1, 1, 0, 1],
        };

        let paths = generate_dashboard_charts(&charts, &dir.path().join("charts")).unwrap();
        assert_eq!(paths.len(), 4);
        for path in paths {
            assert!(path.exists(), "{} missing", path.display());
        }
    }
}
