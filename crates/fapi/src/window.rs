//! Trailing forecast window ending at the evaluation month end.

use crate::{FapiError, Result, columns};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Selects the forecasts issued within a trailing window of months.
///
/// The window ends on the last calendar day of the evaluation month. When
/// the evaluation month is earlier than the window length, the window is
/// clamped to January 1 of the evaluation year, since forecasts for the
/// required forward fiscal years do not exist before the year begins.
/// Otherwise it starts on the day before the first day of the start month.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWindow {
    months: u32,
}

impl Default for ForecastWindow {
    fn default() -> Self {
        Self { months: 6 }
    }
}

impl ForecastWindow {
    /// Window spanning `months` trailing months.
    pub const fn new(months: u32) -> Self {
        Self { months }
    }

    /// Window length in months.
    pub const fn months(&self) -> u32 {
        self.months
    }

    /// Inclusive `[start, end]` date bounds for an evaluation month.
    pub fn bounds(&self, year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
        let end = month_end(year, month)?;

        let start = if month < self.months {
            first_of_month(year, 1)?
        } else {
            first_of_month(year, month + 1 - self.months)?
                .pred_opt()
                .ok_or_else(|| FapiError::InvalidDate(format!("day before {year}-{month:02}-01")))?
        };

        Ok((start, end))
    }

    /// Keep the forecasts dated within the window.
    pub fn apply(&self, forecasts: LazyFrame, year: i32, month: u32) -> Result<LazyFrame> {
        let (start, end) = self.bounds(year, month)?;
        tracing::debug!(%start, %end, months = self.months, "forecast window");

        Ok(forecasts.filter(
            col(columns::FORECAST_DATE)
                .gt_eq(lit(start))
                .and(col(columns::FORECAST_DATE).lt_eq(lit(end))),
        ))
    }
}

/// Last calendar day of a month.
pub fn month_end(year: i32, month: u32) -> Result<NaiveDate> {
    let next = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };

    next.pred_opt()
        .ok_or_else(|| FapiError::InvalidDate(format!("end of {year}-{month:02}")))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| FapiError::InvalidDate(format!("{year}-{month:02}-01")))
}
