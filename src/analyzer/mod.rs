//! Analysis engine for determining the release impact of commits

pub mod aggregator;
pub mod classifier;

pub use aggregator::{severity, BumpAggregator};
pub use classifier::CommitClassifier;
