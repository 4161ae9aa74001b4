//! Latest forecast per analyst and security.

use crate::columns;
use polars::prelude::*;

/// Keep one row per (analyst, security): the one with the latest forecast date.
///
/// `carry` lists the columns kept alongside the key and the forecast date.
/// On equal forecast dates the row appearing later in the input wins.
/// Applying this to an already deduplicated frame returns the same rows.
pub fn latest_per_analyst(forecasts: LazyFrame, carry: &[&str]) -> LazyFrame {
    let by_date = SortMultipleOptions::default().with_maintain_order(true);

    let mut aggs: Vec<Expr> = carry
        .iter()
        .map(|name| {
            col(*name)
                .sort_by([col(columns::FORECAST_DATE)], by_date.clone())
                .last()
                .alias(*name)
        })
        .collect();
    aggs.push(
        col(columns::FORECAST_DATE)
            .max()
            .alias(columns::FORECAST_DATE),
    );

    forecasts
        .group_by([col(columns::ANALYST), col(columns::SECURITY_CODE)])
        .agg(aggs)
}
