use std::collections::BTreeMap;
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;

use booking_features::exceptions::{FeatureError, FeatureResult};
use booking_features::transformers::variable_discretization::QuantileBinner;

/// Helper: create a DataFrame with a single Int64 column "lead_time".
async fn create_df(values: Vec<i64>) -> FeatureResult<DataFrame> {
    let batch = RecordBatch::try_from_iter(vec![(
        "lead_time",
        Arc::new(Int64Array::from(values)) as ArrayRef,
    )])?;
    let mem_table = MemTable::try_new(batch.schema(), vec![vec![batch]])?;
    let ctx = SessionContext::new();
    ctx.register_table("t", Arc::new(mem_table))?;
    Ok(ctx.table("t").await?)
}

async fn collect_one(df: DataFrame) -> FeatureResult<RecordBatch> {
    let batches = df.collect().await?;
    let schema = batches.first().expect("Expected at least one batch").schema();
    Ok(concat_batches(&schema, &batches)?)
}

/// Returns (value, bin) pairs for every row.
async fn binned_rows(df: DataFrame, column: &str) -> FeatureResult<Vec<(i64, i64)>> {
    let batch = collect_one(df).await?;
    let values = batch
        .column(batch.schema().index_of(column)?)
        .as_any()
        .downcast_ref::<Int64Array>()
        .expect("Expected Int64Array for source column")
        .clone();
    let bins = batch
        .column(batch.schema().index_of(&format!("bin_{}", column))?)
        .as_any()
        .downcast_ref::<Int64Array>()
        .expect("Expected Int64Array for bin column")
        .clone();
    assert_eq!(bins.null_count(), 0, "Every row must be assigned a bin");
    Ok(values
        .values()
        .iter()
        .copied()
        .zip(bins.values().iter().copied())
        .collect())
}

fn bucket_sizes(rows: &[(i64, i64)]) -> BTreeMap<i64, usize> {
    let mut sizes = BTreeMap::new();
    for (_, bin) in rows {
        *sizes.entry(*bin).or_insert(0) += 1;
    }
    sizes
}

#[tokio::test]
async fn test_deciles_of_hundred_distinct_values() -> FeatureResult<()> {
    let df = create_df((1..=100).collect()).await?;
    let mut binner = QuantileBinner::new("lead_time");
    binner.fit(&df).await?;
    let labels = binner.labels();
    let rows = binned_rows(binner.transform(df)?, "lead_time").await?;

    assert_eq!(labels.len(), 10);
    assert_eq!(labels[0], "(1.0, 10.9)");
    assert_eq!(labels[9], "(90.1, 100.0)");

    let sizes = bucket_sizes(&rows);
    assert_eq!(sizes.len(), 10);
    for (bin, size) in &sizes {
        assert!((9..=11).contains(size), "Bin {} has {} rows", bin, size);
    }
    assert_eq!(rows.iter().find(|(v, _)| *v == 1).map(|r| r.1), Some(0));
    assert_eq!(rows.iter().find(|(v, _)| *v == 100).map(|r| r.1), Some(9));
    // Bins follow value order.
    assert!(rows.windows(2).all(|w| w[0].1 <= w[1].1));
    Ok(())
}

#[tokio::test]
async fn test_few_distinct_values_collapse_buckets() -> FeatureResult<()> {
    let df = create_df(vec![0, 0, 0, 0, 0, 0, 0, 1, 2, 2, 3, 3]).await?;
    let mut binner = QuantileBinner::new("lead_time");
    binner.fit(&df).await?;
    let labels = binner.labels();
    let rows = binned_rows(binner.transform(df)?, "lead_time").await?;

    assert!(labels.len() < 10);
    assert_eq!(labels.len(), binner.bucket_count());
    assert_eq!(labels.len(), binner.edges().len() - 1);
    let sizes = bucket_sizes(&rows);
    assert!(sizes.keys().all(|bin| (*bin as usize) < labels.len()));
    assert_eq!(rows[0].1, 0);
    assert_eq!(rows.last().map(|r| r.1), Some(labels.len() as i64 - 1));
    Ok(())
}

#[tokio::test]
async fn test_constant_column_gets_single_bucket() -> FeatureResult<()> {
    let df = create_df(vec![7, 7, 7, 7]).await?;
    let mut binner = QuantileBinner::new("lead_time");
    binner.fit(&df).await?;
    assert_eq!(binner.labels(), vec!["(7.0, 7.0)"]);
    let rows = binned_rows(binner.transform(df)?, "lead_time").await?;
    assert!(rows.iter().all(|(_, bin)| *bin == 0));
    Ok(())
}

#[tokio::test]
async fn test_custom_bin_count() -> FeatureResult<()> {
    let batch = RecordBatch::try_from_iter(vec![(
        "adr",
        Arc::new(Float64Array::from(vec![10.0, 20.0, 30.0, 40.0, 50.0])) as ArrayRef,
    )])?;
    let ctx = SessionContext::new();
    let df = ctx.read_batch(batch)?;
    let mut binner = QuantileBinner::with_bins("adr", 4);
    binner.fit(&df).await?;

    let edges = binner.edges();
    assert_eq!(edges.len(), 5);
    assert_abs_diff_eq!(edges[1], 20.0);
    assert_abs_diff_eq!(edges[3], 40.0);
    assert_eq!(
        binner.labels(),
        vec!["(10.0, 20.0)", "(20.0, 30.0)", "(30.0, 40.0)", "(40.0, 50.0)"]
    );
    Ok(())
}

#[tokio::test]
async fn test_binning_requires_numeric_column() -> FeatureResult<()> {
    let batch = RecordBatch::try_from_iter(vec![(
        "meal",
        Arc::new(StringArray::from(vec!["BB", "FB"])) as ArrayRef,
    )])?;
    let ctx = SessionContext::new();
    let df = ctx.read_batch(batch)?;
    let mut binner = QuantileBinner::new("meal");
    let result = binner.fit(&df).await;
    assert!(matches!(result, Err(FeatureError::InvalidParameter(_))));
    Ok(())
}

#[tokio::test]
async fn test_binning_missing_column() -> FeatureResult<()> {
    let df = create_df(vec![1, 2, 3]).await?;
    let mut binner = QuantileBinner::new("adr");
    let result = binner.fit(&df).await;
    assert!(matches!(result, Err(FeatureError::MissingColumn(c)) if c == "adr"));
    Ok(())
}

#[tokio::test]
async fn test_zero_bins_rejected() -> FeatureResult<()> {
    let df = create_df(vec![1, 2, 3]).await?;
    let mut binner = QuantileBinner::with_bins("lead_time", 0);
    let result = binner.fit(&df).await;
    assert!(matches!(result, Err(FeatureError::InvalidParameter(_))));
    Ok(())
}

#[tokio::test]
async fn test_transform_before_fit() -> FeatureResult<()> {
    let df = create_df(vec![1, 2, 3]).await?;
    let binner = QuantileBinner::new("lead_time");
    assert!(matches!(binner.transform(df), Err(FeatureError::FitNotCalled)));
    Ok(())
}
