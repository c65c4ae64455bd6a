//! ## Calendar Keys for Booking Arrivals
//!
//! - **PeriodKey:** Rewrites `arrival_date_month` from an English month name to its number
//!   (1–12), rewrites `arrival_date_year` to its two-digit form, and appends a `YearMonth` key
//!   formatted as `<yy>/<m>` (e.g. `"23/3"`; the month is not zero-padded).
//!
//! The two source columns are overwritten in place, so the transformer is not idempotent:
//! fitting it again on its own output fails because the month column is no longer textual.
//!
//! The two-digit year is the text between the first and second occurrence of `"20"` in the
//! year's string form. `2017` gives `"17"`, while `2020` and years without `"20"` give an empty
//! string.

use crate::exceptions::{FeatureError, FeatureResult};
use crate::impl_transformer;
use crate::transformers::categorical_encoding::extract_distinct_values;
use arrow::datatypes::DataType;
use chrono::Month;
use datafusion::logical_expr::{cast, ident, lit, Case as DFCase, Expr};
use datafusion::prelude::*;
use datafusion::scalar::ScalarValue;
use tracing::debug;

/// Month-name column of the booking dataset.
pub const ARRIVAL_MONTH: &str = "arrival_date_month";
/// Arrival year column of the booking dataset.
pub const ARRIVAL_YEAR: &str = "arrival_date_year";
/// Derived period key column.
pub const YEAR_MONTH: &str = "YearMonth";

/// The twelve English month names, January first.
pub fn month_names() -> Vec<&'static str> {
    let mut month = Month::January;
    let mut names = Vec::with_capacity(12);
    for _ in 0..12 {
        names.push(month.name());
        month = month.succ();
    }
    names
}

/// Returns the 1-based number of an exact, case-sensitive month name.
pub fn month_number(name: &str) -> Option<i64> {
    month_names()
        .iter()
        .position(|m| *m == name)
        .map(|i| i as i64 + 1)
}

fn validate_text_column(df: &DataFrame, col_name: &str) -> FeatureResult<()> {
    let field = df
        .schema()
        .field_with_name(None, col_name)
        .map_err(|_| FeatureError::MissingColumn(col_name.to_string()))?;
    match field.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Ok(()),
        dt => Err(FeatureError::InvalidParameter(format!(
            "Column '{}' must hold month names, but found {:?}",
            col_name, dt
        ))),
    }
}

/// `CASE WHEN month = 'January' THEN 1 ... WHEN month = 'December' THEN 12 END`
fn month_number_expr(col_name: &str) -> Expr {
    let when_then_expr = month_names()
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            (
                Box::new(ident(col_name).eq(lit(name))),
                Box::new(lit(i as i64 + 1)),
            )
        })
        .collect();
    Expr::Case(DFCase {
        expr: None,
        when_then_expr,
        else_expr: Some(Box::new(lit(ScalarValue::Int64(None)))),
    })
}

/// Second `"20"`-delimited segment of the year's string form.
fn two_digit_year_expr(col_name: &str) -> Expr {
    datafusion_functions::string::split_part().call(vec![
        cast(ident(col_name), DataType::Utf8),
        lit("20"),
        lit(2_i64),
    ])
}

/// Derives the `YearMonth` period key from the arrival month and year.
pub struct PeriodKey {
    pub month_column: String,
    pub year_column: String,
    pub output_column: String,
}

impl Default for PeriodKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodKey {
    /// Uses the booking dataset's arrival columns and writes `YearMonth`.
    pub fn new() -> Self {
        Self {
            month_column: ARRIVAL_MONTH.to_string(),
            year_column: ARRIVAL_YEAR.to_string(),
            output_column: YEAR_MONTH.to_string(),
        }
    }

    /// Validates the source columns and checks that every month value is a month name.
    pub async fn fit(&mut self, df: &DataFrame) -> FeatureResult<()> {
        df.schema()
            .field_with_name(None, &self.year_column)
            .map_err(|_| FeatureError::MissingColumn(self.year_column.clone()))?;
        validate_text_column(df, &self.month_column)?;
        let observed = extract_distinct_values(df, &self.month_column).await?;
        if let Some(unknown) = observed.iter().find(|m| month_number(m).is_none()) {
            return Err(FeatureError::UnknownMonth(unknown.clone()));
        }
        debug!(months = ?observed, "period key source validated");
        Ok(())
    }

    /// Rewrites the month and year columns and appends the period key.
    pub fn transform(&self, df: DataFrame) -> FeatureResult<DataFrame> {
        let df = df
            .with_column(&self.month_column, month_number_expr(&self.month_column))?
            .with_column(&self.year_column, two_digit_year_expr(&self.year_column))?;
        let key = datafusion_functions::string::concat().call(vec![
            ident(&self.year_column),
            lit("/"),
            cast(ident(&self.month_column), DataType::Utf8),
        ]);
        df.with_column(&self.output_column, key)
            .map_err(FeatureError::from)
    }

    // Only validation happens in fit.
    fn inherent_is_stateful(&self) -> bool {
        false
    }
}

impl_transformer!(PeriodKey);
