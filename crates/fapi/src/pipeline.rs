//! The monthly forecast-shift index pipeline.
//!
//! [`Fapi`] owns one snapshot of the source tables and runs every stage
//! against it:
//!
//! 1. window the forecasts to the evaluation month ([`ForecastWindow`]);
//! 2. resolve disclosures and estimate FTTM ([`EarningsEstimator`]);
//! 3. aggregate to institution forward ROE ([`RoeAggregator`]);
//! 4. repeat 1-3 for the prior month and compare ([`IndexComposer`]).
//!
//! The importance and validity signals are computed on demand from the same
//! windowed forecasts.

use crate::{
    FapiError, Result,
    aggregator::RoeAggregator,
    composer::{FapiResult, IndexComposer},
    config::FapiConfig,
    estimator::EarningsEstimator,
    importance::ImportanceScorer,
    records::{ActualDisclosure, ForecastRecord, IndustryProfit, forecast_frame},
    traits::Signal,
    validity::ValidityScorer,
    window::{ForecastWindow, month_end},
};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Forecast-shift index engine over one snapshot of the source tables.
#[derive(Debug, Clone)]
pub struct Fapi {
    forecasts: DataFrame,
    disclosures: Vec<ActualDisclosure>,
    importance: ImportanceScorer,
    validity: ValidityScorer,
    config: FapiConfig,
}

impl Fapi {
    /// Engine with the default configuration.
    pub fn new(
        forecasts: &[ForecastRecord],
        disclosures: Vec<ActualDisclosure>,
        industry_profits: &[IndustryProfit],
    ) -> Result<Self> {
        Self::with_config(forecasts, disclosures, industry_profits, FapiConfig::default())
    }

    /// Engine with a custom configuration.
    pub fn with_config(
        forecasts: &[ForecastRecord],
        disclosures: Vec<ActualDisclosure>,
        industry_profits: &[IndustryProfit],
        config: FapiConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            forecasts: forecast_frame(forecasts)?,
            disclosures,
            importance: ImportanceScorer::new(industry_profits)?,
            validity: ValidityScorer::with_config(config.validity.clone()),
            config,
        })
    }

    /// Returns the current configuration.
    pub const fn config(&self) -> &FapiConfig {
        &self.config
    }

    /// Trailing forecast window in use.
    pub const fn window(&self) -> ForecastWindow {
        ForecastWindow::new(self.config.window_months)
    }

    /// Forecasts issued within the window of an evaluation month.
    pub fn windowed_forecasts(&self, year: i32, month: u32) -> Result<LazyFrame> {
        self.window().apply(self.forecasts.clone().lazy(), year, month)
    }

    /// Forward ROE per (industry, institution) as of the end of a month.
    pub fn forward_roe(&self, year: i32, month: u32) -> Result<DataFrame> {
        let as_of = month_end(year, month)?;
        let forecasts = self.windowed_forecasts(year, month)?;

        let estimates = EarningsEstimator.estimate(forecasts, &self.disclosures, as_of)?;
        let roe = RoeAggregator.aggregate(&estimates)?;

        tracing::debug!(
            %as_of,
            estimates = estimates.height(),
            institutions = roe.height(),
            "aggregated forward roe"
        );
        Ok(roe)
    }

    /// Compute the forecast-shift index for the month of `evaluation_date`.
    ///
    /// The evaluation month is compared with the previous month of the same
    /// year, both as of their month ends. January has no prior month in
    /// scope and is rejected before any table is touched.
    pub fn compute_fapi(&self, evaluation_date: NaiveDate) -> Result<Vec<FapiResult>> {
        let (year, month) = (evaluation_date.year(), evaluation_date.month());
        if !(2..=12).contains(&month) {
            return Err(FapiError::InvalidEvaluationMonth { month });
        }

        tracing::info!(%evaluation_date, year, month, "computing forecast-shift index");

        let current = self.forward_roe(year, month)?;
        let prior = self.forward_roe(year, month - 1)?;
        let results =
            IndexComposer::new(self.config.improvement_threshold).compose(&current, &prior)?;

        tracing::info!(industries = results.len(), "forecast-shift index computed");
        Ok(results)
    }

    /// Compute a signal over the windowed forecasts of `date`'s month.
    pub fn signal(&self, signal: &dyn Signal, date: NaiveDate) -> Result<DataFrame> {
        let forecasts = self.windowed_forecasts(date.year(), date.month())?;
        let result = signal.compute(&forecasts, date)?;

        tracing::debug!(
            signal = signal.name(),
            level = %signal.level(),
            rows = result.height(),
            "computed signal"
        );
        Ok(result)
    }

    /// Institution importance per industry for `date`'s month.
    pub fn importance(&self, date: NaiveDate) -> Result<DataFrame> {
        self.signal(&self.importance, date)
    }

    /// Forecast staleness per (analyst, security) for `date`'s month.
    pub fn validity(&self, date: NaiveDate) -> Result<DataFrame> {
        self.signal(&self.validity, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{columns, records::InterimDisclosure};
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn forecast(
        institution: &str,
        analyst: &str,
        code: &str,
        industry: &str,
        date: NaiveDate,
        fy1: f64,
    ) -> ForecastRecord {
        ForecastRecord {
            institution: institution.to_string(),
            analyst: analyst.to_string(),
            security_code: code.to_string(),
            industry: industry.to_string(),
            forecast_date: date,
            fy1_profit: Some(fy1),
            fy2_profit: Some(fy1 * 1.2),
            fy3_profit: Some(fy1 * 1.4),
            hist_profit: Some(fy1 * 0.8),
        }
    }

    /// A security with no interim report yet and annual net assets of 100.
    fn undisclosed(code: &str) -> ActualDisclosure {
        ActualDisclosure {
            security_code: code.to_string(),
            q1: InterimDisclosure::default(),
            h1: InterimDisclosure::default(),
            q3: InterimDisclosure::default(),
            fy0_net_asset: Some(100.0),
        }
    }

    fn profits() -> Vec<IndustryProfit> {
        vec![IndustryProfit {
            industry: "X".to_string(),
            total_net_profit: Some(200.0),
        }]
    }

    fn two_institution_engine() -> Fapi {
        let forecasts = [
            forecast("A", "chen", "600000", "X", d(2021, 7, 10), 10.0),
            forecast("A", "chen", "600000", "X", d(2021, 8, 10), 12.0),
            forecast("B", "li", "000001", "X", d(2021, 7, 12), 9.0),
            forecast("B", "li", "000001", "X", d(2021, 8, 12), 8.0),
        ];
        let disclosures = vec![undisclosed("600000"), undisclosed("000001")];

        Fapi::new(&forecasts, disclosures, &profits()).unwrap()
    }

    #[test]
    fn test_end_to_end_half_improved() {
        let engine = two_institution_engine();

        let result = engine.compute_fapi(d(2021, 8, 30)).unwrap();

        assert_eq!(
            result,
            vec![FapiResult {
                industry: "X".to_string(),
                improved_count: 1,
                total_count: 2,
                ratio: 0.5,
            }]
        );
    }

    #[test]
    fn test_forward_roe_per_month() {
        let engine = two_institution_engine();

        let august = engine.forward_roe(2021, 8).unwrap();
        let roe = august.column(columns::FORWARD_ROE).unwrap().f64().unwrap();
        // Sorted by institution: A = 12 / 100, B = 8 / 100
        assert_relative_eq!(roe.get(0).unwrap(), 0.12, epsilon = 1e-12);
        assert_relative_eq!(roe.get(1).unwrap(), 0.08, epsilon = 1e-12);

        let july = engine.forward_roe(2021, 7).unwrap();
        let roe = july.column(columns::FORWARD_ROE).unwrap().f64().unwrap();
        assert_relative_eq!(roe.get(0).unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(roe.get(1).unwrap(), 0.09, epsilon = 1e-12);
    }

    #[test]
    fn test_interim_disclosure_blends_fttm() {
        let forecasts = [
            forecast("A", "chen", "600000", "X", d(2021, 7, 10), 100.0),
            forecast("A", "chen", "600000", "X", d(2021, 8, 10), 100.0),
        ];
        let disclosures = vec![ActualDisclosure {
            h1: InterimDisclosure {
                date: Some(d(2021, 8, 15)),
                net_asset: Some(1_000.0),
                net_profit: Some(50.0),
            },
            ..undisclosed("600000")
        }];
        let engine = Fapi::new(&forecasts, disclosures, &profits()).unwrap();

        // July: no interim report, FTTM = FY1 = 100 over annual assets of 100.
        let july = engine.forward_roe(2021, 7).unwrap();
        let roe = july.column(columns::FORWARD_ROE).unwrap().f64().unwrap();
        assert_relative_eq!(roe.get(0).unwrap(), 1.0, epsilon = 1e-12);

        // August: FTTM = 100 - 50 + 120 * 0.5 = 110 over half-year assets of 1000.
        let august = engine.forward_roe(2021, 8).unwrap();
        let roe = august.column(columns::FORWARD_ROE).unwrap().f64().unwrap();
        assert_relative_eq!(roe.get(0).unwrap(), 0.11, epsilon = 1e-12);

        let result = engine.compute_fapi(d(2021, 8, 1)).unwrap();
        assert_eq!(result[0].improved_count, 0);
        assert_eq!(result[0].total_count, 1);
    }

    #[test]
    fn test_january_is_rejected() {
        let engine = two_institution_engine();

        let err = engine.compute_fapi(d(2021, 1, 31)).unwrap_err();
        assert!(matches!(
            err,
            FapiError::InvalidEvaluationMonth { month: 1 }
        ));
    }

    #[test]
    fn test_institution_new_this_month_is_not_compared() {
        let forecasts = [
            forecast("A", "chen", "600000", "X", d(2021, 7, 10), 10.0),
            forecast("A", "chen", "600000", "X", d(2021, 8, 10), 12.0),
            forecast("C", "zhao", "000001", "X", d(2021, 8, 20), 15.0),
        ];
        let disclosures = vec![undisclosed("600000"), undisclosed("000001")];
        let engine = Fapi::new(&forecasts, disclosures, &profits()).unwrap();

        let result = engine.compute_fapi(d(2021, 8, 31)).unwrap();
        assert_eq!(result[0].improved_count, 1);
        assert_eq!(result[0].total_count, 1);
    }

    #[test]
    fn test_zero_prior_roe_is_rejected() {
        let forecasts = [
            forecast("A", "chen", "600000", "X", d(2021, 7, 10), 0.0),
            forecast("A", "chen", "600000", "X", d(2021, 8, 10), 12.0),
        ];
        let engine = Fapi::new(&forecasts, vec![undisclosed("600000")], &profits()).unwrap();

        let err = engine.compute_fapi(d(2021, 8, 31)).unwrap_err();
        assert!(matches!(err, FapiError::DivisionByZero { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = FapiConfig {
            window_months: 0,
            ..Default::default()
        };
        let err = Fapi::with_config(&[], Vec::new(), &[], config).unwrap_err();
        assert!(matches!(err, FapiError::InvalidConfig(_)));
    }

    #[test]
    fn test_signals() {
        let engine = two_institution_engine();

        // A: 12 * 0.8 + 10 * 0.8 = 17.6, B: 8 * 0.8 + 9 * 0.8 = 13.6, over 200
        let importance = engine.importance(d(2021, 8, 31)).unwrap();
        let shares = importance
            .column(columns::IMPORTANCE)
            .unwrap()
            .f64()
            .unwrap();
        assert_relative_eq!(shares.get(0).unwrap(), 0.088, epsilon = 1e-12);
        assert_relative_eq!(shares.get(1).unwrap(), 0.068, epsilon = 1e-12);

        let validity = engine.validity(d(2021, 8, 31)).unwrap();
        assert_eq!(validity.height(), 2);
        let years = validity.column(columns::VALIDITY).unwrap().f64().unwrap();
        // chen: 2021-08-10 -> 2022-04-30 is 263 days
        assert_relative_eq!(years.get(0).unwrap(), 263.0 / 365.0, epsilon = 1e-12);
    }
}
