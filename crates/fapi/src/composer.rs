//! Month-over-month composition of the forecast-shift index.

use crate::{
    FapiError, Result,
    columns::{self, first_key},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Forecast-shift index of one industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FapiResult {
    /// Industry classification
    pub industry: String,
    /// Institutions whose forward ROE improved beyond the threshold
    pub improved_count: u32,
    /// Institutions compared across both months
    pub total_count: u32,
    /// `improved_count / total_count`
    pub ratio: f64,
}

/// Compares institution forward ROE between two months.
///
/// An institution improved when
/// ```text
/// now > last  and  (now - last) / last > threshold
/// ```
/// Institutions without a prior-month value are not compared. A prior-month
/// value of zero is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexComposer {
    threshold: f64,
}

impl Default for IndexComposer {
    fn default() -> Self {
        Self { threshold: 1e-4 }
    }
}

impl IndexComposer {
    /// Composer with a custom relative improvement threshold.
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Relative improvement threshold.
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compose the index from the current and prior month forward ROE tables.
    ///
    /// Both tables carry `industry`, `institution` and `forward_roe`. Results
    /// are sorted by ratio, highest first, then by industry.
    pub fn compose(&self, current: &DataFrame, prior: &DataFrame) -> Result<Vec<FapiResult>> {
        let roe_of = |df: &DataFrame, alias: &str| {
            df.clone().lazy().select([
                col(columns::INDUSTRY),
                col(columns::INSTITUTION),
                col(columns::FORWARD_ROE).alias(alias),
            ])
        };

        let joined = roe_of(current, columns::ROE_NOW)
            .join(
                roe_of(prior, columns::ROE_LAST),
                [col(columns::INDUSTRY), col(columns::INSTITUTION)],
                [col(columns::INDUSTRY), col(columns::INSTITUTION)],
                JoinArgs::new(JoinType::Left),
            )
            .collect()?;

        let compared = joined.clone().lazy().drop_nulls(None).collect()?;
        let unmatched = joined.height() - compared.height();
        if unmatched > 0 {
            tracing::warn!(unmatched, "institutions without a prior-month forward ROE");
        }

        let zero_prior = compared
            .clone()
            .lazy()
            .filter(col(columns::ROE_LAST).eq(lit(0.0)))
            .collect()?;
        if let Some(key) = first_key(&zero_prior, &[columns::INDUSTRY, columns::INSTITUTION])? {
            return Err(FapiError::DivisionByZero {
                stage: "index composer",
                key,
            });
        }

        let now = col(columns::ROE_NOW);
        let last = col(columns::ROE_LAST);
        let improved = now
            .clone()
            .gt(last.clone())
            .and(((now - last.clone()) / last).gt(lit(self.threshold)));

        let index = compared
            .lazy()
            .with_column(improved.alias(columns::IMPROVED))
            .group_by([col(columns::INDUSTRY)])
            .agg([
                col(columns::IMPROVED)
                    .cast(DataType::UInt32)
                    .sum()
                    .cast(DataType::UInt32)
                    .alias(columns::IMPROVED_COUNT),
                len().cast(DataType::UInt32).alias(columns::TOTAL_COUNT),
            ])
            .with_column(
                (col(columns::IMPROVED_COUNT).cast(DataType::Float64)
                    / col(columns::TOTAL_COUNT).cast(DataType::Float64))
                .alias(columns::FAPI),
            )
            .sort(
                [columns::FAPI, columns::INDUSTRY],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;

        to_results(&index)
    }
}

fn to_results(index: &DataFrame) -> Result<Vec<FapiResult>> {
    let industries = index.column(columns::INDUSTRY)?.str()?;
    let improved = index.column(columns::IMPROVED_COUNT)?.u32()?;
    let total = index.column(columns::TOTAL_COUNT)?.u32()?;
    let ratio = index.column(columns::FAPI)?.f64()?;

    industries
        .into_iter()
        .zip(improved)
        .zip(total)
        .zip(ratio)
        .map(|(((industry, improved), total), ratio)| {
            match (industry, improved, total, ratio) {
                (Some(industry), Some(improved_count), Some(total_count), Some(ratio)) => {
                    Ok(FapiResult {
                        industry: industry.to_string(),
                        improved_count,
                        total_count,
                        ratio,
                    })
                }
                _ => Err(FapiError::Computation(
                    "null value in composed index row".to_string(),
                )),
            }
        })
        .collect()
}
