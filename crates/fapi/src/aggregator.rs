//! Institution-level forward ROE per industry.

use crate::{
    FapiError, Result,
    columns::{self, first_key},
    dedup::latest_per_analyst,
};
use polars::prelude::*;

/// Aggregates per-forecast FTTM into one forward ROE per (industry, institution).
///
/// Aggregation is two-level:
/// 1. per (industry, institution, analyst), sum `fttm` and `net_asset` and
///    take their ratio as the analyst's forward ROE;
/// 2. per (industry, institution), sum the analyst ROEs.
///
/// Analyst ROEs are summed, not pooled and not divided by the analyst count.
///
/// # Required Columns
/// - `institution`, `analyst`, `security_code`, `industry`, `forecast_date`
/// - `net_asset`, `fttm`
///
/// # Returns
/// DataFrame with columns `industry`, `institution`, `forward_roe`, sorted by
/// industry then institution.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoeAggregator;

impl RoeAggregator {
    /// Aggregate FTTM estimates into institution forward ROE.
    pub fn aggregate(&self, estimates: &DataFrame) -> Result<DataFrame> {
        let latest = latest_per_analyst(
            estimates.clone().lazy(),
            &[
                columns::INSTITUTION,
                columns::INDUSTRY,
                columns::NET_ASSET,
                columns::FTTM,
            ],
        );

        let analysts = latest
            .group_by([
                col(columns::INDUSTRY),
                col(columns::INSTITUTION),
                col(columns::ANALYST),
            ])
            .agg([
                col(columns::NET_ASSET).sum().alias(columns::NET_ASSET),
                col(columns::FTTM).sum().alias(columns::FTTM),
            ])
            .collect()?;

        let degenerate = analysts
            .clone()
            .lazy()
            .filter(col(columns::NET_ASSET).eq(lit(0.0)))
            .collect()?;
        if let Some(key) = first_key(
            &degenerate,
            &[columns::INDUSTRY, columns::INSTITUTION, columns::ANALYST],
        )? {
            return Err(FapiError::DivisionByZero {
                stage: "roe aggregator",
                key,
            });
        }

        let result = analysts
            .lazy()
            .with_column((col(columns::FTTM) / col(columns::NET_ASSET)).alias(columns::ANALYST_ROE))
            .group_by([col(columns::INDUSTRY), col(columns::INSTITUTION)])
            .agg([col(columns::ANALYST_ROE).sum().alias(columns::FORWARD_ROE)])
            .sort(
                [columns::INDUSTRY, columns::INSTITUTION],
                SortMultipleOptions::default(),
            )
            .collect()?;

        Ok(result)
    }
}
