//! # Categorical Encoding
//!
//! - **OneHotEncoder:** Replaces each categorical column with one Boolean indicator column per
//!   distinct category, named `<column>_<category>`.
//!
//! The encoder learns the category set of every target column in `fit` and rewrites the
//! DataFrame's projection in `transform`. Indicator groups take the position of the column they
//! replace, and categories are ordered by the natural sort order of the column's type.

use crate::exceptions::{FeatureError, FeatureResult};
use crate::impl_transformer;
use arrow::array::{Array, StringArray};
use arrow::datatypes::DataType;
use datafusion::logical_expr::{cast, ident, lit, Case as DFCase, Expr};
use datafusion::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Extract the distinct non-null values of a column as strings, sorted by the column's own
/// type (so integers sort numerically and strings lexicographically).
pub(crate) async fn extract_distinct_values(
    df: &DataFrame,
    col_name: &str,
) -> FeatureResult<Vec<String>> {
    df.schema()
        .field_with_name(None, col_name)
        .map_err(|_| FeatureError::MissingColumn(col_name.to_string()))?;
    let distinct_df = df
        .clone()
        .select(vec![ident(col_name).alias(col_name)])?
        .distinct()?
        .sort(vec![ident(col_name).sort(true, false)])?
        .select(vec![cast(ident(col_name), DataType::Utf8).alias(col_name)])?;
    let batches = distinct_df.collect().await?;
    let mut values = Vec::new();
    for batch in batches {
        let array = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                FeatureError::InvalidParameter(format!(
                    "Expected Utf8 array for column {}",
                    col_name
                ))
            })?;
        for i in 0..array.len() {
            if !array.is_null(i) {
                values.push(array.value(i).to_string());
            }
        }
    }
    Ok(values)
}

/// Builds `CASE WHEN CAST(<col> AS Utf8) = '<category>' THEN true ELSE false END`.
fn indicator_expr(col_name: &str, category: &str) -> Expr {
    Expr::Case(DFCase {
        expr: None,
        when_then_expr: vec![(
            Box::new(cast(ident(col_name), DataType::Utf8).eq(lit(category))),
            Box::new(lit(true)),
        )],
        else_expr: Some(Box::new(lit(false))),
    })
}

/// ------------------------- OneHotEncoder -------------------------
///
/// One-hot expands categorical columns in place. Columns that are not targeted keep their
/// values and their relative order.
pub struct OneHotEncoder {
    pub columns: Vec<String>,
    /// Mapping from column name to its sorted distinct categories.
    pub categories: HashMap<String, Vec<String>>,
    fitted: bool,
}

impl OneHotEncoder {
    /// Create a new OneHotEncoder for the specified columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            categories: HashMap::new(),
            fitted: false,
        }
    }

    /// Names of the indicator columns that replace `col_name`, in output order.
    pub fn indicator_names(&self, col_name: &str) -> Vec<String> {
        self.categories
            .get(col_name)
            .map(|cats| {
                cats.iter()
                    .map(|cat| format!("{}_{}", col_name, cat))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Learn the distinct category values of each target column.
    pub async fn fit(&mut self, df: &DataFrame) -> FeatureResult<()> {
        self.categories.clear();
        for col_name in &self.columns {
            let values = extract_distinct_values(df, col_name).await?;
            debug!(column = %col_name, categories = ?values, "one-hot categories learned");
            self.categories.insert(col_name.clone(), values);
        }
        self.fitted = true;
        Ok(())
    }

    /// Replace every target column with its indicator columns.
    pub fn transform(&self, df: DataFrame) -> FeatureResult<DataFrame> {
        if !self.fitted {
            return Err(FeatureError::FitNotCalled);
        }
        for col_name in &self.columns {
            df.schema()
                .field_with_name(None, col_name)
                .map_err(|_| FeatureError::MissingColumn(col_name.clone()))?;
        }
        let mut exprs = Vec::new();
        for field in df.schema().fields() {
            let name = field.name();
            if !self.columns.contains(name) {
                exprs.push(ident(name));
                continue;
            }
            if let Some(cats) = self.categories.get(name) {
                for cat in cats {
                    exprs.push(indicator_expr(name, cat).alias(format!("{}_{}", name, cat)));
                }
            }
        }
        df.select(exprs).map_err(FeatureError::from)
    }

    // This transformer is stateful.
    fn inherent_is_stateful(&self) -> bool {
        true
    }
}

impl_transformer!(OneHotEncoder);
