//! # Transformer Implementations
//!
//! One submodule per kind of booking feature.

pub mod calendar_features;
pub mod categorical_encoding;
pub mod feature_creation;
pub mod variable_discretization;
