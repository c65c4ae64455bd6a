//! ## Custom Errors for Booking Features
//!
//! This module defines the error type shared by every transformer in the crate.
//! `FeatureError` is derived with `thiserror` and separates lookup failures
//! (missing columns, unknown month names) from type and parameter failures,
//! while engine errors from DataFusion and Arrow are wrapped as they are.
//!
//! ### Example
//!
//! ```rust
//! use booking_features::exceptions::{FeatureError, FeatureResult};
//!
//! fn lookup(name: &str) -> FeatureResult<()> {
//!     Err(FeatureError::MissingColumn(name.into()))
//! }
//!
//! assert!(lookup("lead_time").is_err());
//! ```

use thiserror::Error;

/// Errors raised while deriving booking features.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Wraps errors from DataFusion.
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] datafusion::error::DataFusionError),

    /// Wraps errors from Arrow.
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// An invalid parameter or an unsupported column type (e.g., binning a string column).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The specified column does not exist in the DataFrame.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A value of the month column is not one of the twelve English month names.
    #[error("Unknown month name: {0:?}")]
    UnknownMonth(String),

    /// `transform` was called on a stateful transformer before `fit`.
    #[error("Transform called before fit for stateful transformer")]
    FitNotCalled,
}

/// A convenient result type for booking feature operations.
pub type FeatureResult<T> = std::result::Result<T, FeatureError>;
