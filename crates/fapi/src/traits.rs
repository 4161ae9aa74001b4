//! Core trait definitions for weighting signals.
//!
//! Signals are auxiliary measures computed alongside the index from the same
//! windowed forecasts. The index composition does not consume them; they are
//! exposed through the [`Signal`] trait so a weighted composition can use any
//! of them uniformly.

use crate::Result;
use chrono::NaiveDate;
use derive_more::Display;
use polars::prelude::*;

/// Granularity of the rows a signal produces.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalLevel {
    /// One row per (industry, institution)
    Institution,
    /// One row per (analyst, security)
    Analyst,
}

/// A weighting signal derived from windowed forecasts.
pub trait Signal: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this signal.
    ///
    /// Should be snake_case and stable across versions.
    fn name(&self) -> &str;

    /// Human-readable description of what this signal measures.
    fn description(&self) -> &str;

    /// Granularity of the output rows.
    fn level(&self) -> SignalLevel;

    /// Columns required in the input DataFrame.
    fn required_columns(&self) -> &[&str];

    /// Compute the signal from forecasts already restricted to the window
    /// of the evaluation month containing `date`.
    fn compute(&self, forecasts: &LazyFrame, date: NaiveDate) -> Result<DataFrame>;
}
