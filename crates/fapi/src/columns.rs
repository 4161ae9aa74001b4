//! Column names shared by every stage of the pipeline.
//!
//! Frames produced by one stage are consumed by the next, so every column is
//! addressed through these constants rather than ad-hoc labels.

/// Research institution that published the forecast.
pub const INSTITUTION: &str = "institution";
/// Analyst who issued the forecast.
pub const ANALYST: &str = "analyst";
/// Security identifier.
pub const SECURITY_CODE: &str = "security_code";
/// Industry classification.
pub const INDUSTRY: &str = "industry";
/// Date the forecast was issued.
pub const FORECAST_DATE: &str = "forecast_date";
/// Forecast net profit for the first forward fiscal year.
pub const FY1_PROFIT: &str = "fy1_profit";
/// Forecast net profit for the second forward fiscal year.
pub const FY2_PROFIT: &str = "fy2_profit";
/// Forecast net profit for the third forward fiscal year.
pub const FY3_PROFIT: &str = "fy3_profit";
/// Reported net profit of the fixed historical year.
pub const HIST_PROFIT: &str = "hist_profit";

/// Interim period known as of the evaluation date.
pub const REPORT_PERIOD: &str = "report_period";
/// Net profit of the resolved interim disclosure.
pub const DISCLOSED_NET_PROFIT: &str = "disclosed_net_profit";
/// Net assets of the resolved interim disclosure (or the annual fallback).
pub const NET_ASSET: &str = "net_asset";
/// Blended trailing-twelve-month earnings estimate.
pub const FTTM: &str = "fttm";

/// Forward ROE of one analyst for one industry.
pub const ANALYST_ROE: &str = "analyst_roe";
/// Forward ROE of one institution for one industry.
pub const FORWARD_ROE: &str = "forward_roe";
/// Forward ROE for the evaluation month.
pub const ROE_NOW: &str = "roe_now";
/// Forward ROE for the prior month.
pub const ROE_LAST: &str = "roe_last";
/// Whether the institution's forward ROE improved.
pub const IMPROVED: &str = "improved";
/// Number of improving institutions in an industry.
pub const IMPROVED_COUNT: &str = "improved_count";
/// Number of compared institutions in an industry.
pub const TOTAL_COUNT: &str = "total_count";
/// Share of improving institutions.
pub const FAPI: &str = "fapi";

/// Industry-wide total net profit of the reference year.
pub const INDUSTRY_TOTAL_PROFIT: &str = "industry_total_profit";
/// Institution share of the industry's profit.
pub const IMPORTANCE: &str = "importance";
/// Min-max normalised institution share.
pub const IMPORTANCE_MINMAX: &str = "importance_minmax";
/// Years between the latest forecast and the reference date.
pub const VALIDITY: &str = "validity";

/// Key of the first row of `df`, joined from the given string columns.
///
/// Used to name the offending row when a stage rejects degenerate data.
pub(crate) fn first_key(
    df: &polars::prelude::DataFrame,
    names: &[&str],
) -> crate::Result<Option<String>> {
    if df.height() == 0 {
        return Ok(None);
    }

    let mut parts = Vec::with_capacity(names.len());
    for name in names {
        let value = df.column(name)?.str()?.get(0).unwrap_or("<null>");
        parts.push(value.to_string());
    }

    Ok(Some(parts.join("/")))
}
