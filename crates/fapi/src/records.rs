//! Typed input records and their conversion into polars frames.
//!
//! Loading the source tables is the caller's concern; the pipeline receives
//! them already materialised as these records. Missing source values are
//! `None` and become nulls in the frames.

use crate::{Result, columns, period::ReportPeriod};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One analyst's forward net-profit forecast for one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Institution employing the analyst
    pub institution: String,
    /// Analyst who issued the forecast
    pub analyst: String,
    /// Security covered
    pub security_code: String,
    /// Industry classification of the security
    pub industry: String,
    /// Date the forecast was issued
    pub forecast_date: NaiveDate,
    /// Net profit forecast for the first forward fiscal year
    pub fy1_profit: Option<f64>,
    /// Net profit forecast for the second forward fiscal year
    pub fy2_profit: Option<f64>,
    /// Net profit forecast for the third forward fiscal year
    pub fy3_profit: Option<f64>,
    /// Reported net profit of the fixed historical year
    pub hist_profit: Option<f64>,
}

/// One interim actual-disclosure event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InterimDisclosure {
    /// Date the figures were published
    pub date: Option<NaiveDate>,
    /// Reported net assets
    pub net_asset: Option<f64>,
    /// Reported net profit attributable to shareholders
    pub net_profit: Option<f64>,
}

/// Interim disclosures of one security for the current fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualDisclosure {
    /// Security code
    pub security_code: String,
    /// First-quarter report
    pub q1: InterimDisclosure,
    /// Half-year report
    pub h1: InterimDisclosure,
    /// Third-quarter report
    pub q3: InterimDisclosure,
    /// Net assets from the last annual report, used before any interim report
    pub fy0_net_asset: Option<f64>,
}

/// Figures of the disclosure known for a security at an evaluation date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDisclosure {
    /// Period the figures come from
    pub period: ReportPeriod,
    /// Disclosed net profit; zero before any interim report
    pub net_profit: Option<f64>,
    /// Disclosed net assets; the annual figure before any interim report
    pub net_asset: Option<f64>,
}

impl ActualDisclosure {
    /// Resolve the figures known for this security as of `as_of`.
    pub fn resolve(&self, as_of: NaiveDate) -> ResolvedDisclosure {
        let period = ReportPeriod::resolve(self.q1.date, self.h1.date, self.q3.date, as_of);
        let interim = match period {
            ReportPeriod::None => {
                return ResolvedDisclosure {
                    period,
                    net_profit: Some(0.0),
                    net_asset: self.fy0_net_asset,
                };
            }
            ReportPeriod::Q1 => &self.q1,
            ReportPeriod::H1 => &self.h1,
            ReportPeriod::Q3 => &self.q3,
        };

        ResolvedDisclosure {
            period,
            net_profit: interim.net_profit,
            net_asset: interim.net_asset,
        }
    }
}

/// Industry-wide net profit for the reference year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryProfit {
    /// Industry classification
    pub industry: String,
    /// Total net profit of the industry
    pub total_net_profit: Option<f64>,
}

/// Build the forecast table.
pub fn forecast_frame(records: &[ForecastRecord]) -> Result<DataFrame> {
    let df = df! {
        columns::INSTITUTION => records.iter().map(|r| r.institution.clone()).collect::<Vec<_>>(),
        columns::ANALYST => records.iter().map(|r| r.analyst.clone()).collect::<Vec<_>>(),
        columns::SECURITY_CODE => records.iter().map(|r| r.security_code.clone()).collect::<Vec<_>>(),
        columns::INDUSTRY => records.iter().map(|r| r.industry.clone()).collect::<Vec<_>>(),
        columns::FORECAST_DATE => records.iter().map(|r| r.forecast_date).collect::<Vec<_>>(),
        columns::FY1_PROFIT => records.iter().map(|r| r.fy1_profit).collect::<Vec<_>>(),
        columns::FY2_PROFIT => records.iter().map(|r| r.fy2_profit).collect::<Vec<_>>(),
        columns::FY3_PROFIT => records.iter().map(|r| r.fy3_profit).collect::<Vec<_>>(),
        columns::HIST_PROFIT => records.iter().map(|r| r.hist_profit).collect::<Vec<_>>(),
    }?;

    Ok(df)
}

/// Build the per-security table of disclosures known as of `as_of`.
///
/// Each row is resolved independently of every other row.
pub fn resolved_disclosure_frame(
    disclosures: &[ActualDisclosure],
    as_of: NaiveDate,
) -> Result<DataFrame> {
    let resolved: Vec<ResolvedDisclosure> = disclosures.iter().map(|d| d.resolve(as_of)).collect();

    let df = df! {
        columns::SECURITY_CODE => disclosures.iter().map(|d| d.security_code.clone()).collect::<Vec<_>>(),
        columns::REPORT_PERIOD => resolved.iter().map(|r| r.period.to_string()).collect::<Vec<_>>(),
        columns::DISCLOSED_NET_PROFIT => resolved.iter().map(|r| r.net_profit).collect::<Vec<_>>(),
        columns::NET_ASSET => resolved.iter().map(|r| r.net_asset).collect::<Vec<_>>(),
    }?;

    Ok(df)
}

/// Build the industry total-profit table.
pub fn industry_profit_frame(profits: &[IndustryProfit]) -> Result<DataFrame> {
    let df = df! {
        columns::INDUSTRY => profits.iter().map(|p| p.industry.clone()).collect::<Vec<_>>(),
        columns::INDUSTRY_TOTAL_PROFIT => profits.iter().map(|p| p.total_net_profit).collect::<Vec<_>>(),
    }?;

    Ok(df)
}
