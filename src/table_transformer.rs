//! ## Table Transformer
//!
//! [`TableTransformer`] holds one booking DataFrame and applies the four booking transforms
//! to it, replacing the held DataFrame after every successful call. A failing call leaves the
//! held DataFrame untouched.
//!
//! Ordering matters: [`TableTransformer::derive_period_key`] rewrites the arrival month and year
//! columns, so it runs once, before anything that expects them numeric.

use crate::exceptions::FeatureResult;
use crate::pipeline::Transformer;
use crate::transformers::calendar_features::PeriodKey;
use crate::transformers::categorical_encoding::OneHotEncoder;
use crate::transformers::feature_creation::StayDuration;
use crate::transformers::variable_discretization::QuantileBinner;
use datafusion::prelude::DataFrame;
use tracing::debug;

pub struct TableTransformer {
    df: DataFrame,
}

impl TableTransformer {
    /// Wraps a DataFrame. Nothing is copied or validated.
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Fits `transformer` on the held DataFrame, then replaces it with the transformed one.
    async fn apply<T>(&mut self, mut transformer: T) -> FeatureResult<T>
    where
        T: Transformer + Send,
    {
        transformer.fit(&self.df).await?;
        self.df = transformer.transform(self.df.clone())?;
        Ok(transformer)
    }

    /// Numbers the arrival month, shortens the arrival year and adds `YearMonth`.
    pub async fn derive_period_key(&mut self) -> FeatureResult<()> {
        debug!("deriving period key");
        self.apply(PeriodKey::new()).await?;
        Ok(())
    }

    /// Adds `duration = stays_in_weekend_nights + stays_in_week_nights`.
    pub async fn derive_duration(&mut self) -> FeatureResult<()> {
        debug!("deriving stay duration");
        self.apply(StayDuration::new()).await?;
        Ok(())
    }

    /// One-hot expands `columns` and returns the new DataFrame.
    pub async fn expand_categorical<S: AsRef<str>>(
        &mut self,
        columns: &[S],
    ) -> FeatureResult<DataFrame> {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        debug!(?columns, "expanding categorical columns");
        self.apply(OneHotEncoder::new(columns)).await?;
        Ok(self.df.clone())
    }

    /// Adds `bin_<prop>` with decile bucket indices and returns the DataFrame with the labels.
    pub async fn quantile_bin(&mut self, prop: &str) -> FeatureResult<(DataFrame, Vec<String>)> {
        debug!(column = prop, "quantile binning");
        let binner = self.apply(QuantileBinner::new(prop)).await?;
        Ok((self.df.clone(), binner.labels()))
    }
}
