//! Core distribution-parsing types

pub mod amount;
pub mod dates;
pub mod distribution;
pub mod fund;

// Re-export main types for cleaner imports
pub use dates::{DateNormalizer, YearPivot};
pub use distribution::{DistributionRecord, DistributionStore, DistributionTable};
pub use fund::{FundClassifier, FundKind};
