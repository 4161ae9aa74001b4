//! Institution importance within an industry.
//!
//! An institution's importance is the share of the industry's reference-year
//! profit earned by the securities it covers, min-max normalised within the
//! industry.

use crate::{
    FapiError, Result,
    columns::{self, first_key},
    records::{IndustryProfit, industry_profit_frame},
    traits::{Signal, SignalLevel},
};
use chrono::NaiveDate;
use polars::prelude::*;

/// Coverage-weighted importance of each institution per industry.
///
/// Computes:
/// ```text
/// importance        = sum(hist_profit) / industry_total_profit
/// importance_minmax = (importance - min) / (max - min)
/// ```
/// where the sum runs over the institution's windowed forecasts in the
/// industry and `min`/`max` are taken within the industry.
///
/// An industry whose institutions all share one importance value has no
/// spread to normalise and is rejected, as is an industry with zero total
/// profit.
///
/// # Returns
/// DataFrame with columns: `industry`, `institution`, `hist_profit`,
/// `industry_total_profit`, `importance`, `importance_minmax`.
#[derive(Debug, Clone)]
pub struct ImportanceScorer {
    totals: DataFrame,
}

impl ImportanceScorer {
    /// Scorer over the given industry totals.
    pub fn new(profits: &[IndustryProfit]) -> Result<Self> {
        Ok(Self {
            totals: industry_profit_frame(profits)?,
        })
    }
}

impl Signal for ImportanceScorer {
    fn name(&self) -> &str {
        "importance"
    }

    fn description(&self) -> &str {
        "Institution share of industry profit among covered securities, min-max normalised"
    }

    fn level(&self) -> SignalLevel {
        SignalLevel::Institution
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::INDUSTRY, columns::INSTITUTION, columns::HIST_PROFIT]
    }

    fn compute(&self, forecasts: &LazyFrame, _date: NaiveDate) -> Result<DataFrame> {
        let shares = forecasts
            .clone()
            .group_by([col(columns::INDUSTRY), col(columns::INSTITUTION)])
            .agg([col(columns::HIST_PROFIT).sum().alias(columns::HIST_PROFIT)])
            .join(
                self.totals.clone().lazy(),
                [col(columns::INDUSTRY)],
                [col(columns::INDUSTRY)],
                JoinArgs::new(JoinType::Inner),
            )
            .drop_nulls(None)
            .collect()?;

        let zero_total = shares
            .clone()
            .lazy()
            .filter(col(columns::INDUSTRY_TOTAL_PROFIT).eq(lit(0.0)))
            .collect()?;
        if let Some(key) = first_key(&zero_total, &[columns::INDUSTRY])? {
            return Err(FapiError::DivisionByZero {
                stage: "importance scorer",
                key,
            });
        }

        let ranged = shares
            .lazy()
            .with_column(
                (col(columns::HIST_PROFIT) / col(columns::INDUSTRY_TOTAL_PROFIT))
                    .alias(columns::IMPORTANCE),
            )
            .with_columns([
                col(columns::IMPORTANCE)
                    .min()
                    .over([col(columns::INDUSTRY)])
                    .alias("importance_min"),
                col(columns::IMPORTANCE)
                    .max()
                    .over([col(columns::INDUSTRY)])
                    .alias("importance_max"),
            ])
            .collect()?;

        let flat = ranged
            .clone()
            .lazy()
            .filter(col("importance_max").eq(col("importance_min")))
            .collect()?;
        if let Some(key) = first_key(&flat, &[columns::INDUSTRY])? {
            return Err(FapiError::DivisionByZero {
                stage: "importance scorer",
                key,
            });
        }

        let result = ranged
            .lazy()
            .with_column(
                ((col(columns::IMPORTANCE) - col("importance_min"))
                    / (col("importance_max") - col("importance_min")))
                .alias(columns::IMPORTANCE_MINMAX),
            )
            .select([
                col(columns::INDUSTRY),
                col(columns::INSTITUTION),
                col(columns::HIST_PROFIT),
                col(columns::INDUSTRY_TOTAL_PROFIT),
                col(columns::IMPORTANCE),
                col(columns::IMPORTANCE_MINMAX),
            ])
            .sort(
                [columns::INDUSTRY, columns::INSTITUTION],
                SortMultipleOptions::default(),
            )
            .collect()?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 8, 31).unwrap()
    }

    fn totals() -> Vec<IndustryProfit> {
        vec![
            IndustryProfit {
                industry: "Banks".to_string(),
                total_net_profit: Some(100.0),
            },
            IndustryProfit {
                industry: "Media".to_string(),
                total_net_profit: Some(0.0),
            },
        ]
    }

    #[test]
    fn test_importance_minmax() {
        let forecasts = df! {
            columns::INDUSTRY => ["Banks", "Banks", "Banks", "Banks", "Steel"],
            columns::INSTITUTION => ["Alpha", "Alpha", "Beta", "Gamma", "Alpha"],
            columns::HIST_PROFIT => [20.0, 10.0, 10.0, 20.0, 5.0],
        }
        .unwrap();

        let scorer = ImportanceScorer::new(&totals()).unwrap();
        let result = scorer.compute(&forecasts.lazy(), date()).unwrap();

        // Steel has no industry total and drops out of the inner join.
        assert_eq!(result.height(), 3);

        let institutions: Vec<_> = result
            .column(columns::INSTITUTION)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(institutions, ["Alpha", "Beta", "Gamma"]);

        let importance = result.column(columns::IMPORTANCE).unwrap().f64().unwrap();
        assert_relative_eq!(importance.get(0).unwrap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(importance.get(1).unwrap(), 0.1, epsilon = 1e-12);

        let minmax = result
            .column(columns::IMPORTANCE_MINMAX)
            .unwrap()
            .f64()
            .unwrap();
        assert_relative_eq!(minmax.get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(minmax.get(1).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(minmax.get(2).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_single_institution_industry_is_rejected() {
        let forecasts = df! {
            columns::INDUSTRY => ["Banks"],
            columns::INSTITUTION => ["Alpha"],
            columns::HIST_PROFIT => [20.0],
        }
        .unwrap();

        let scorer = ImportanceScorer::new(&totals()).unwrap();
        let err = scorer.compute(&forecasts.lazy(), date()).unwrap_err();
        match err {
            FapiError::DivisionByZero { key, .. } => assert_eq!(key, "Banks"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_industry_total_is_rejected() {
        let forecasts = df! {
            columns::INDUSTRY => ["Media", "Media"],
            columns::INSTITUTION => ["Alpha", "Beta"],
            columns::HIST_PROFIT => [20.0, 10.0],
        }
        .unwrap();

        let scorer = ImportanceScorer::new(&totals()).unwrap();
        let err = scorer.compute(&forecasts.lazy(), date()).unwrap_err();
        assert!(matches!(err, FapiError::DivisionByZero { .. }));
    }

    #[test]
    fn test_importance_metadata() {
        let scorer = ImportanceScorer::new(&[]).unwrap();
        assert_eq!(scorer.name(), "importance");
        assert_eq!(scorer.level(), SignalLevel::Institution);
        assert_eq!(
            scorer.required_columns(),
            &["industry", "institution", "hist_profit"]
        );
    }
}
