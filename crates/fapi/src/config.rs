//! Pipeline configuration.

use crate::{FapiError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Configuration for the forecast-shift index pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FapiConfig {
    /// Number of trailing months of forecasts considered for each evaluation month.
    /// Default is 6.
    pub window_months: u32,
    /// Minimum relative ROE increase for an institution to count as improved.
    /// Default is 0.0001 (one basis point of the prior value).
    pub improvement_threshold: f64,
    /// Reference point for the forecast staleness signal.
    pub validity: ValidityConfig,
}

impl Default for FapiConfig {
    fn default() -> Self {
        Self {
            window_months: 6,
            improvement_threshold: 1e-4,
            validity: ValidityConfig::default(),
        }
    }
}

impl FapiConfig {
    /// Check that every value is usable before any table is touched.
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.window_months) {
            return Err(FapiError::InvalidConfig(format!(
                "window_months must be within 1..=12, got {}",
                self.window_months
            )));
        }
        if !self.improvement_threshold.is_finite() || self.improvement_threshold < 0.0 {
            return Err(FapiError::InvalidConfig(format!(
                "improvement_threshold must be a non-negative finite number, got {}",
                self.improvement_threshold
            )));
        }
        self.validity.validate()
    }
}

/// Reference date used to annualise forecast staleness.
///
/// The reference is `reference_month`/`reference_day` of the evaluation year
/// plus `year_offset`, i.e. the annual-report deadline of the year after
/// evaluation by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityConfig {
    /// Month of the reference date. Default is 4 (April).
    pub reference_month: u32,
    /// Day of the reference date. Default is 30.
    pub reference_day: u32,
    /// Years added to the evaluation year. Default is 1.
    pub year_offset: i32,
    /// Days per year used for annualisation. Default is 365.
    pub days_per_year: f64,
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            reference_month: 4,
            reference_day: 30,
            year_offset: 1,
            days_per_year: 365.0,
        }
    }
}

impl ValidityConfig {
    /// Reference date for a given evaluation year.
    pub fn reference_date(&self, evaluation_year: i32) -> Result<NaiveDate> {
        let year = evaluation_year + self.year_offset;
        NaiveDate::from_ymd_opt(year, self.reference_month, self.reference_day).ok_or_else(|| {
            FapiError::InvalidDate(format!(
                "{year}-{:02}-{:02}",
                self.reference_month, self.reference_day
            ))
        })
    }

    fn validate(&self) -> Result<()> {
        // Checked against a non-leap year so the reference exists every year.
        if NaiveDate::from_ymd_opt(2001, self.reference_month, self.reference_day).is_none() {
            return Err(FapiError::InvalidConfig(format!(
                "validity reference {:02}-{:02} is not a date in every year",
                self.reference_month, self.reference_day
            )));
        }
        if self.days_per_year.is_nan() || self.days_per_year <= 0.0 {
            return Err(FapiError::InvalidConfig(format!(
                "days_per_year must be positive, got {}",
                self.days_per_year
            )));
        }
        Ok(())
    }
}
