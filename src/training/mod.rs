//! Model training module
//!
//! - Seeded train/test split
//! - Regression trees and the bagged Random Forest built from them
//! - Held-out regression metrics and OOB scoring

mod config;
mod engine;
pub mod decision_tree;
pub mod metrics;
pub mod random_forest;
pub mod split;

pub use config::TrainingConfig;
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::TrainEngine;
pub use metrics::{r2_score, ModelMetrics};
pub use random_forest::RandomForest;
pub use split::TrainTestSplit;
