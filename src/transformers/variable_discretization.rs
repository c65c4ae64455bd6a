//! ## Quantile Discretization
//!
//! - [`QuantileBinner`]: Splits a numeric column into `q` equal-population buckets (deciles by
//!   default) and writes each row's bucket index to a new `bin_<column>` column.
//!
//! Bucket edges are the column's quantiles at `0, 1/q, ..., 1`, computed with linear
//! interpolation between order statistics. Coinciding edges are collapsed, so heavily repeated
//! values produce fewer than `q` buckets. Bucket `0` is closed on both sides (`[e0, e1]`) and
//! every later bucket `i` is `(e_i, e_{i+1}]`. Values outside the fitted range map to NULL.
//!
//! A column holding a single distinct value gets one bucket, `0`, labelled `"(v, v)"`.

use crate::exceptions::{FeatureError, FeatureResult};
use crate::impl_transformer;
use arrow::array::{Array, Float64Array};
use arrow::datatypes::DataType;
use datafusion::dataframe::DataFrame;
use datafusion::logical_expr::{cast, ident, lit, Case as DFCase, Expr};
use datafusion::scalar::ScalarValue;
use tracing::debug;

/// Number of buckets used by [`QuantileBinner::new`].
pub const DEFAULT_BINS: usize = 10;

/// Validates that a column exists and holds numbers.
fn validate_numeric_column(df: &DataFrame, col_name: &str) -> FeatureResult<()> {
    let field = df
        .schema()
        .field_with_name(None, col_name)
        .map_err(|_| FeatureError::MissingColumn(col_name.to_string()))?;
    if field.data_type().is_numeric() {
        Ok(())
    } else {
        Err(FeatureError::InvalidParameter(format!(
            "Column '{}' must be numeric, but found {:?}",
            col_name,
            field.data_type()
        )))
    }
}

/// Collects the non-null values of a numeric column as sorted f64s.
async fn collect_sorted_values(df: &DataFrame, col_name: &str) -> FeatureResult<Vec<f64>> {
    let batches = df
        .clone()
        .select(vec![cast(ident(col_name), DataType::Float64).alias(col_name)])?
        .collect()
        .await?;
    let mut values = Vec::new();
    for batch in batches {
        let array = batch
            .column(0)
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                FeatureError::InvalidParameter(format!(
                    "Expected Float64 array for column {}",
                    col_name
                ))
            })?;
        values.extend(array.iter().flatten());
    }
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// Quantile of sorted data at probability `p`, interpolating linearly between neighbours.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
    }
}

/// Distinct quantile edges of sorted, non-empty data for `bins` buckets.
pub(crate) fn quantile_edges(sorted: &[f64], bins: usize) -> Vec<f64> {
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| quantile(sorted, i as f64 / bins as f64))
        .collect();
    edges.dedup();
    edges
}

/// Turns edges into `(low, high)` bucket ranges; a single edge becomes one point bucket.
fn edges_to_buckets(edges: &[f64]) -> Vec<(f64, f64)> {
    match edges {
        [] => Vec::new(),
        [only] => vec![(*only, *only)],
        _ => edges.windows(2).map(|pair| (pair[0], pair[1])).collect(),
    }
}

/// Formats a bucket range with one decimal place, e.g. `"(10.9, 20.8)"`.
pub fn bucket_label(low: f64, high: f64) -> String {
    format!("({:.1}, {:.1})", low, high)
}

/// `CASE WHEN v >= e0 AND v <= e1 THEN 0 WHEN v > e1 AND v <= e2 THEN 1 ... END`
fn build_bucket_case_expr(col_name: &str, buckets: &[(f64, f64)]) -> Expr {
    let value = cast(ident(col_name), DataType::Float64);
    let when_then_expr = buckets
        .iter()
        .enumerate()
        .map(|(i, (low, high))| {
            let lower_bound = if i == 0 {
                value.clone().gt_eq(lit(*low))
            } else {
                value.clone().gt(lit(*low))
            };
            let condition = lower_bound.and(value.clone().lt_eq(lit(*high)));
            (Box::new(condition), Box::new(lit(i as i64)))
        })
        .collect::<Vec<_>>();
    Expr::Case(DFCase {
        expr: None,
        when_then_expr,
        else_expr: Some(Box::new(lit(ScalarValue::Int64(None)))),
    })
}

/// Assigns each row of a numeric column to an equal-population bucket.
pub struct QuantileBinner {
    pub column: String,
    pub bins: usize,
    edges: Vec<f64>,
    buckets: Vec<(f64, f64)>,
    fitted: bool,
}

impl QuantileBinner {
    /// Decile binning of `column`.
    pub fn new(column: &str) -> Self {
        Self::with_bins(column, DEFAULT_BINS)
    }

    pub fn with_bins(column: &str, bins: usize) -> Self {
        Self {
            column: column.to_string(),
            bins,
            edges: Vec::new(),
            buckets: Vec::new(),
            fitted: false,
        }
    }

    /// Name of the column holding the bucket indices.
    pub fn output_column(&self) -> String {
        format!("bin_{}", self.column)
    }

    /// Distinct bucket edges learned by `fit`.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of buckets retained after collapsing duplicate edges.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// One `"(<low>, <high>)"` label per bucket, index-aligned with the bucket numbers.
    pub fn labels(&self) -> Vec<String> {
        self.buckets
            .iter()
            .map(|(low, high)| bucket_label(*low, *high))
            .collect()
    }

    /// Computes the quantile edges of the column.
    pub async fn fit(&mut self, df: &DataFrame) -> FeatureResult<()> {
        if self.bins < 1 {
            return Err(FeatureError::InvalidParameter(
                "Number of bins must be at least 1".to_string(),
            ));
        }
        validate_numeric_column(df, &self.column)?;
        let values = collect_sorted_values(df, &self.column).await?;
        if values.is_empty() {
            return Err(FeatureError::InvalidParameter(format!(
                "Column '{}' has no values to bin",
                self.column
            )));
        }
        self.edges = quantile_edges(&values, self.bins);
        self.buckets = edges_to_buckets(&self.edges);
        debug!(
            column = %self.column,
            edges = ?self.edges,
            buckets = self.buckets.len(),
            "quantile edges computed"
        );
        self.fitted = true;
        Ok(())
    }

    /// Appends the `bin_<column>` bucket index column.
    pub fn transform(&self, df: DataFrame) -> FeatureResult<DataFrame> {
        if !self.fitted {
            return Err(FeatureError::FitNotCalled);
        }
        validate_numeric_column(&df, &self.column)?;
        let expr = build_bucket_case_expr(&self.column, &self.buckets);
        df.with_column(&self.output_column(), expr)
            .map_err(FeatureError::from)
    }

    // This transformer is stateful.
    fn inherent_is_stateful(&self) -> bool {
        true
    }
}

impl_transformer!(QuantileBinner);
