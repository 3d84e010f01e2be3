//! Feature preparation
//!
//! - Column schema validation
//! - Label encoding of class names
//! - Feature matrix / target construction

mod encoder;
mod features;
mod schema;

pub use encoder::ClassEncoder;
pub use features::{FeatureBuilder, FeatureSet, FEATURE_NAMES};
pub use schema::ColumnSchema;
