//! Utility functions and types

pub mod data_loader;
pub mod paths;

pub use data_loader::{DataLoader, DataSaver};
pub use paths::{
    ensure_parent_dir, resolve_input, resolve_output, DATASET_SUFFIX, DEFAULT_OUTPUT_FILE,
};
