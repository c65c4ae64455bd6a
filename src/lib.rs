//! # Booking Features
//!
//! Feature engineering for hotel booking datasets on top of Apache DataFusion.
//!
//! The crate derives a chronological `YearMonth` key from the arrival month and year,
//! sums the weekend and weekday stays into a `duration` column, one-hot expands categorical
//! columns, and discretizes numeric columns into decile bins with readable range labels.
//!
//! Each operation is a [`pipeline::Transformer`] in [`transformers`], and the
//! [`table_transformer::TableTransformer`] facade runs them against a single held DataFrame.
//!
//! ```rust,no_run
//! use booking_features::table_transformer::TableTransformer;
//! # async fn run(df: datafusion::prelude::DataFrame) -> booking_features::exceptions::FeatureResult<()> {
//! let mut table = TableTransformer::new(df);
//! table.derive_period_key().await?;
//! table.derive_duration().await?;
//! table.expand_categorical(&["meal"]).await?;
//! let (_binned, labels) = table.quantile_bin("lead_time").await?;
//! println!("{:?}", labels);
//! # Ok(())
//! # }
//! ```

pub mod exceptions;
pub mod logging;
pub mod pipeline;
pub mod table_transformer;
pub mod transformers;
