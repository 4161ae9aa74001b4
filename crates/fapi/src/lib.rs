#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fapi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregator;
pub mod columns;
pub mod composer;
pub mod config;
pub mod dedup;
pub mod error;
pub mod estimator;
pub mod importance;
pub mod period;
pub mod pipeline;
pub mod records;
pub mod traits;
pub mod validity;
pub mod window;

// Re-export core types
pub use aggregator::RoeAggregator;
pub use composer::{FapiResult, IndexComposer};
pub use config::{FapiConfig, ValidityConfig};
pub use error::{FapiError, Result};
pub use estimator::EarningsEstimator;
pub use importance::ImportanceScorer;
pub use period::ReportPeriod;
pub use pipeline::Fapi;
pub use records::{ActualDisclosure, ForecastRecord, IndustryProfit, InterimDisclosure};
pub use traits::{Signal, SignalLevel};
pub use validity::ValidityScorer;
pub use window::ForecastWindow;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
