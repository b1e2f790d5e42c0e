//! Quantile edges, equal-count binning and rank-first tie breaking using Polars

use polars::prelude::*;

fn value_column(values: &[f64]) -> Float64Chunked {
    Float64Chunked::from_vec("value".into(), values.to_vec())
}

/// Quantile edges splitting `values` into `bins` equal-count groups.
///
/// Uses linear interpolation between order statistics at position
/// `(n - 1) * q`. Returns `bins + 1` edges, or an empty vector for empty input.
pub fn quantile_edges(values: &[f64], bins: usize) -> PolarsResult<Vec<f64>> {
    if values.is_empty() || bins == 0 {
        return Ok(Vec::new());
    }

    let column = value_column(values);
    let step = 1.0 / bins as f64;
    (0..=bins)
        .map(|i| {
            let q = if i == bins { 1.0 } else { i as f64 * step };
            column
                .quantile(q, QuantileMethod::Linear)?
                .ok_or_else(|| PolarsError::ComputeError("quantile of an empty column".into()))
        })
        .collect()
}

/// True when every edge is strictly greater than the one before it
pub fn edges_are_unique(edges: &[f64]) -> bool {
    edges.windows(2).all(|w| w[0] < w[1])
}

/// Zero-based bin for `value` given ascending `edges`.
///
/// Bins are left-open and right-closed, except the first which also
/// contains `edges[0]`. Values outside the edges clamp to the outer bins.
pub fn bin_index(edges: &[f64], value: f64) -> usize {
    let bins = edges.len().saturating_sub(1);
    if bins == 0 {
        return 0;
    }
    // First edge >= value, i.e. a left-sided search
    let idx = edges.partition_point(|&edge| edge < value);
    idx.saturating_sub(1).min(bins - 1)
}

/// Distinct 1-based ranks; equal values are ranked in order of appearance
pub fn rank_first(values: &[f64]) -> PolarsResult<Vec<f64>> {
    let ranked = DataFrame::new(vec![Column::new("value".into(), values)])?
        .lazy()
        .select([col("value")
            .rank(
                RankOptions {
                    method: RankMethod::Ordinal,
                    descending: false,
                },
                None,
            )
            .cast(DataType::Float64)
            .alias("rank")])
        .collect()?;

    Ok(ranked.column("rank")?.f64()?.into_no_null_iter().collect())
}

/// Number of distinct values
pub fn distinct_count(values: &[f64]) -> PolarsResult<usize> {
    value_column(values).into_series().n_unique()
}

/// Values in ascending order
pub fn sorted_values(values: &[f64]) -> Vec<f64> {
    value_column(values).sort(false).into_no_null_iter().collect()
}
