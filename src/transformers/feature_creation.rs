//! ## Transformers for creating new features
//!
//! - **StayDuration:** Adds the total length of stay, `duration`, as the row-wise sum of the
//!   weekend-night and week-night counts.
//!
//! The output column is overwritten if it already exists, so re-running the transformer on an
//! unchanged DataFrame yields the same result.

use crate::exceptions::{FeatureError, FeatureResult};
use crate::impl_transformer;
use datafusion::prelude::*;
use datafusion_expr::{ident, Expr};

/// Weekend nights column of the booking dataset.
pub const WEEKEND_NIGHTS: &str = "stays_in_weekend_nights";
/// Week nights column of the booking dataset.
pub const WEEK_NIGHTS: &str = "stays_in_week_nights";
/// Derived total stay column.
pub const DURATION: &str = "duration";

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

/// Sums two stay columns into a duration column.
pub struct StayDuration {
    pub weekend_column: String,
    pub week_column: String,
    pub output_column: String,
}

impl Default for StayDuration {
    fn default() -> Self {
        Self::new()
    }
}

impl StayDuration {
    /// Uses `stays_in_weekend_nights + stays_in_week_nights` and writes `duration`.
    pub fn new() -> Self {
        Self::with_columns(WEEKEND_NIGHTS, WEEK_NIGHTS, DURATION)
    }

    pub fn with_columns(weekend_column: &str, week_column: &str, output_column: &str) -> Self {
        if output_column.trim().is_empty() {
            panic!("StayDuration: output column name cannot be empty");
        }
        Self {
            weekend_column: weekend_column.to_string(),
            week_column: week_column.to_string(),
            output_column: output_column.to_string(),
        }
    }

    /// Validates that both source columns exist and are numeric.
    pub async fn fit(&mut self, df: &DataFrame) -> FeatureResult<()> {
        validate_numeric_column(df, &self.weekend_column)?;
        validate_numeric_column(df, &self.week_column)
    }

    /// Adds (or recomputes) the duration column.
    pub fn transform(&self, df: DataFrame) -> FeatureResult<DataFrame> {
        validate_numeric_column(&df, &self.weekend_column)?;
        validate_numeric_column(&df, &self.week_column)?;
        let total: Expr = ident(&self.weekend_column) + ident(&self.week_column);
        df.with_column(&self.output_column, total)
            .map_err(FeatureError::from)
    }

    // This transformer is stateless.
    fn inherent_is_stateful(&self) -> bool {
        false
    }
}

impl_transformer!(StayDuration);
