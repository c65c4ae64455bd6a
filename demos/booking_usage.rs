// Run `cargo run --example booking_usage` to execute this example.
// Set DEBUG_BOOKING_FEATURES=true to see the debug logs of each step.

use std::error::Error;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use booking_features::table_transformer::TableTransformer;
use datafusion::prelude::SessionContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A handful of bookings in the layout of the hotel booking demand dataset.
    let batch = RecordBatch::try_from_iter(vec![
        (
            "hotel",
            Arc::new(StringArray::from(vec![
                "Resort Hotel",
                "City Hotel",
                "City Hotel",
                "Resort Hotel",
                "City Hotel",
                "City Hotel",
            ])) as ArrayRef,
        ),
        (
            "lead_time",
            Arc::new(Int64Array::from(vec![342, 7, 13, 14, 0, 75])) as ArrayRef,
        ),
        (
            "arrival_date_year",
            Arc::new(Int64Array::from(vec![2015, 2015, 2016, 2016, 2017, 2017])) as ArrayRef,
        ),
        (
            "arrival_date_month",
            Arc::new(StringArray::from(vec![
                "July", "July", "March", "October", "January", "August",
            ])) as ArrayRef,
        ),
        (
            "stays_in_weekend_nights",
            Arc::new(Int64Array::from(vec![0, 0, 2, 1, 0, 2])) as ArrayRef,
        ),
        (
            "stays_in_week_nights",
            Arc::new(Int64Array::from(vec![0, 1, 5, 3, 2, 4])) as ArrayRef,
        ),
        (
            "meal",
            Arc::new(StringArray::from(vec!["BB", "BB", "HB", "BB", "SC", "FB"])) as ArrayRef,
        ),
    ])?;
    let ctx = SessionContext::new();
    let df = ctx.read_batch(batch)?;

    let mut table = TableTransformer::new(df);
    table.derive_period_key().await?;
    table.derive_duration().await?;
    table.expand_categorical(&["hotel", "meal"]).await?;
    let (binned, labels) = table.quantile_bin("lead_time").await?;

    binned.show().await?;
    for (bin, label) in labels.iter().enumerate() {
        println!("bin {}: {}", bin, label);
    }

    Ok(())
}
