//! ## Transformer Pipeline
//!
//! Core abstractions for chaining the booking transformers.
//!
//! - The [`Transformer`] trait is the common interface of every transformation step. Stateful
//!   steps learn parameters in `fit` (category sets, bin edges); stateless steps only validate.
//! - [`Pipeline`] fits and applies a sequence of steps, feeding each step's output to the next.
//! - The macros [`crate::impl_transformer`] and [`crate::make_pipeline`] remove the boilerplate
//!   of wiring a type to the trait and of boxing the steps.

use crate::exceptions::{FeatureError, FeatureResult};
use async_trait::async_trait;
use datafusion::prelude::*;
use std::time::Instant;
use tracing::debug;

/// A single step of a feature pipeline.
///
/// `fit` may execute the plan to collect what the step needs; `transform` only extends the
/// DataFrame's logical plan and never triggers execution.
#[async_trait]
pub trait Transformer {
    /// Fit the transformer on a DataFrame.
    async fn fit(&mut self, df: &DataFrame) -> FeatureResult<()>;

    /// Return a new DataFrame with the transformation applied.
    fn transform(&self, df: DataFrame) -> FeatureResult<DataFrame>;

    /// Returns true if `fit` must be called before `transform`.
    fn is_stateful(&self) -> bool;
}

/// Implements [`Transformer`] for a type that already has the inherent methods
/// `async fn fit(&mut self, &DataFrame)`, `fn transform(&self, DataFrame)` and
/// `fn inherent_is_stateful(&self) -> bool`.
///
/// # Example
///
/// ```rust,no_run
/// use booking_features::exceptions::FeatureResult;
/// use booking_features::impl_transformer;
/// use datafusion::prelude::DataFrame;
///
/// pub struct Passthrough;
///
/// impl Passthrough {
///     pub async fn fit(&mut self, _df: &DataFrame) -> FeatureResult<()> {
///         Ok(())
///     }
///
///     pub fn transform(&self, df: DataFrame) -> FeatureResult<DataFrame> {
///         Ok(df)
///     }
///
///     pub fn inherent_is_stateful(&self) -> bool {
///         false
///     }
/// }
///
/// impl_transformer!(Passthrough);
/// ```
#[macro_export]
macro_rules! impl_transformer {
    ($ty:ty) => {
        #[async_trait::async_trait]
        impl $crate::pipeline::Transformer for $ty {
            async fn fit(
                &mut self,
                df: &datafusion::prelude::DataFrame,
            ) -> $crate::exceptions::FeatureResult<()> {
                <$ty>::fit(self, df).await
            }
            fn transform(
                &self,
                df: datafusion::prelude::DataFrame,
            ) -> $crate::exceptions::FeatureResult<datafusion::prelude::DataFrame> {
                <$ty>::transform(self, df)
            }
            fn is_stateful(&self) -> bool {
                <$ty>::inherent_is_stateful(self)
            }
        }
    };
}

/// A named, boxed pipeline step.
pub type Step = (String, Box<dyn Transformer + Send + Sync>);

/// A pipeline that chains a sequence of transformers.
///
/// Each step receives the DataFrame produced by the previous one, so ordering dependencies
/// (e.g. binning a column created by an earlier step) are expressed by step order.
pub struct Pipeline {
    steps: Vec<Step>,
    verbose: bool,
}

impl Pipeline {
    /// Creates a new pipeline. If `verbose` is true, step timings are printed.
    pub fn new(steps: Vec<Step>, verbose: bool) -> Self {
        Self { steps, verbose }
    }

    /// Number of steps in the pipeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fits each step on the output of the previous one and returns the final DataFrame.
    pub async fn fit(&mut self, df: &DataFrame) -> FeatureResult<DataFrame> {
        if self.steps.is_empty() {
            return Err(FeatureError::InvalidParameter(
                "Pipeline must have at least one transformer.".to_string(),
            ));
        }
        let mut current_df = df.clone();
        for (name, step) in self.steps.iter_mut() {
            if self.verbose {
                println!("Fitting step: {}", name);
            }
            let start = Instant::now();
            step.fit(&current_df).await.map_err(|e| {
                FeatureError::InvalidParameter(format!(
                    "Error fitting transformer '{}': {}",
                    name, e
                ))
            })?;
            current_df = step.transform(current_df).map_err(|e| {
                FeatureError::InvalidParameter(format!(
                    "Error transforming in '{}': {}",
                    name, e
                ))
            })?;
            debug!(step = %name, elapsed = ?start.elapsed(), "pipeline step fitted");
            if self.verbose {
                println!("Step '{}' completed in {:?}", name, start.elapsed());
            }
        }
        Ok(current_df)
    }

    /// Applies the `transform` method of each step without fitting.
    pub fn transform(&self, df: DataFrame) -> FeatureResult<DataFrame> {
        if self.steps.is_empty() {
            return Err(FeatureError::InvalidParameter(
                "Pipeline must have at least one transformer.".to_string(),
            ));
        }
        let mut current_df = df;
        for (name, step) in self.steps.iter() {
            if self.verbose {
                println!("Applying transformer: {}", name);
            }
            current_df = step.transform(current_df).map_err(|e| {
                FeatureError::InvalidParameter(format!("Error in transformer '{}': {}", name, e))
            })?;
        }
        Ok(current_df)
    }

    /// Convenience method that fits the pipeline and returns the transformed DataFrame.
    pub async fn fit_transform(&mut self, df: &DataFrame) -> FeatureResult<DataFrame> {
        self.fit(df).await
    }
}

/// Builds a [`Pipeline`] and boxes each transformer.
///
/// # Example
///
/// ```rust,no_run
/// use booking_features::make_pipeline;
/// use booking_features::transformers::calendar_features::PeriodKey;
/// use booking_features::transformers::feature_creation::StayDuration;
///
/// let pipeline = make_pipeline!(false,
///     ("period_key", PeriodKey::new()),
///     ("duration", StayDuration::new()),
/// );
/// ```
#[macro_export]
macro_rules! make_pipeline {
    ($verbose:expr, $(($name:expr, $transformer:expr)),+ $(,)?) => {
        {
            let steps: Vec<$crate::pipeline::Step> = vec![
                $(
                    ($name.to_string(), Box::new($transformer)),
                )+
            ];
            $crate::pipeline::Pipeline::new(steps, $verbose)
        }
    };
}
