//! Forecast staleness relative to the next annual-report deadline.

use crate::{
    FapiError, Result,
    columns,
    config::ValidityConfig,
    dedup::latest_per_analyst,
    traits::{Signal, SignalLevel},
};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Annualised distance between each analyst's latest forecast and a fixed
/// reference date.
///
/// Computes:
/// ```text
/// validity = (reference_date - forecast_date).days / days_per_year
/// ```
/// using the latest forecast per (analyst, security). The reference date is
/// April 30 of the year after the evaluation year by default.
///
/// # Returns
/// DataFrame with columns: `analyst`, `security_code`, `institution`,
/// `industry`, `forecast_date`, `validity`.
#[derive(Debug, Clone, Default)]
pub struct ValidityScorer {
    config: ValidityConfig,
}

impl ValidityScorer {
    /// Scorer with a custom reference date.
    pub const fn with_config(config: ValidityConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub const fn config(&self) -> &ValidityConfig {
        &self.config
    }
}

impl Signal for ValidityScorer {
    fn name(&self) -> &str {
        "validity"
    }

    fn description(&self) -> &str {
        "Years between an analyst's latest forecast and the next annual-report deadline"
    }

    fn level(&self) -> SignalLevel {
        SignalLevel::Analyst
    }

    fn required_columns(&self) -> &[&str] {
        &[
            columns::ANALYST,
            columns::SECURITY_CODE,
            columns::INSTITUTION,
            columns::INDUSTRY,
            columns::FORECAST_DATE,
        ]
    }

    fn compute(&self, forecasts: &LazyFrame, date: NaiveDate) -> Result<DataFrame> {
        let reference = self.config.reference_date(date.year())?;
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| FapiError::InvalidDate("1970-01-01".to_string()))?;
        // Date columns are stored as days since the epoch.
        let reference_days = i32::try_from((reference - epoch).num_days())
            .map_err(|_| FapiError::InvalidDate(reference.to_string()))?;

        let result = latest_per_analyst(
            forecasts.clone(),
            &[columns::INSTITUTION, columns::INDUSTRY],
        )
        .with_column(
            ((lit(reference_days) - col(columns::FORECAST_DATE).cast(DataType::Int32))
                .cast(DataType::Float64)
                / lit(self.config.days_per_year))
            .alias(columns::VALIDITY),
        )
        .select([
            col(columns::ANALYST),
            col(columns::SECURITY_CODE),
            col(columns::INSTITUTION),
            col(columns::INDUSTRY),
            col(columns::FORECAST_DATE),
            col(columns::VALIDITY),
        ])
        .sort(
            [columns::ANALYST, columns::SECURITY_CODE],
            SortMultipleOptions::default(),
        )
        .collect()?;

        tracing::debug!(rows = result.height(), %reference, "computed forecast validity");
        Ok(result)
    }
}
