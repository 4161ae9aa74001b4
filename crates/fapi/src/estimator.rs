//! Forward trailing-twelve-month earnings (FTTM) per forecast.
//!
//! Each forecast is joined to the interim disclosure known for its security
//! at the evaluation date. The disclosed year-to-date profit is backed out of
//! the FY1 forecast and replaced by a pro-rated share of the FY2 forecast:
//!
//! ```text
//! FTTM = FY1 - disclosed + FY2 * (disclosed / FY1)
//! ```
//!
//! Before any interim disclosure the disclosed profit is zero and FTTM is
//! exactly FY1.

use crate::{
    FapiError, Result,
    columns::{self, first_key},
    dedup::latest_per_analyst,
    records::{ActualDisclosure, resolved_disclosure_frame},
};
use chrono::NaiveDate;
use polars::prelude::*;

/// Joins windowed forecasts to resolved disclosures and computes FTTM.
///
/// # Required Columns
/// - `institution`, `analyst`, `security_code`, `industry`, `forecast_date`
/// - `fy1_profit`, `fy2_profit`, `fy3_profit`, `hist_profit`
///
/// # Returns
/// One row per (analyst, security) holding the latest forecast, with the
/// resolved `report_period`, `disclosed_net_profit`, `net_asset` and `fttm`.
///
/// Forecasts for securities without a disclosure row are dropped, as are
/// joined rows with any missing value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarningsEstimator;

impl EarningsEstimator {
    /// Estimate FTTM for every latest forecast as of `as_of`.
    pub fn estimate(
        &self,
        forecasts: LazyFrame,
        disclosures: &[ActualDisclosure],
        as_of: NaiveDate,
    ) -> Result<DataFrame> {
        let resolved = resolved_disclosure_frame(disclosures, as_of)?;

        let joined = forecasts
            .join(
                resolved.lazy(),
                [col(columns::SECURITY_CODE)],
                [col(columns::SECURITY_CODE)],
                JoinArgs::new(JoinType::Inner),
            )
            .collect()?;

        let complete = joined.clone().lazy().drop_nulls(None).collect()?;
        let dropped = joined.height() - complete.height();
        if dropped > 0 {
            tracing::warn!(dropped, %as_of, "dropped incomplete forecast rows");
        }

        let latest = latest_per_analyst(
            complete.lazy(),
            &[
                columns::INSTITUTION,
                columns::INDUSTRY,
                columns::FY1_PROFIT,
                columns::FY2_PROFIT,
                columns::REPORT_PERIOD,
                columns::DISCLOSED_NET_PROFIT,
                columns::NET_ASSET,
            ],
        )
        .collect()?;

        let degenerate = latest
            .clone()
            .lazy()
            .filter(
                col(columns::FY1_PROFIT)
                    .eq(lit(0.0))
                    .and(col(columns::DISCLOSED_NET_PROFIT).neq(lit(0.0))),
            )
            .collect()?;
        if let Some(key) = first_key(&degenerate, &[columns::SECURITY_CODE])? {
            return Err(FapiError::DivisionByZero {
                stage: "earnings estimator",
                key,
            });
        }

        let result = latest
            .lazy()
            .with_column(fttm().alias(columns::FTTM))
            .collect()?;

        tracing::debug!(rows = result.height(), %as_of, "estimated forward earnings");
        Ok(result)
    }
}

/// FTTM expression over `fy1_profit`, `fy2_profit` and `disclosed_net_profit`.
pub fn fttm() -> Expr {
    let fy1 = col(columns::FY1_PROFIT);
    let fy2 = col(columns::FY2_PROFIT);
    let disclosed = col(columns::DISCLOSED_NET_PROFIT);

    when(disclosed.clone().eq(lit(0.0)))
        .then(fy1.clone())
        .otherwise(fy1.clone() - disclosed.clone() + fy2 * (disclosed / fy1))
}
