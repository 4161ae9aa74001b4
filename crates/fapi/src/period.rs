//! Resolution of the interim disclosure known at an evaluation date.

use chrono::NaiveDate;
use derive_more::Display;

/// Interim actual-disclosure period known for a security.
///
/// Periods are ordered chronologically within a fiscal year:
/// `None < Q1 < H1 < Q3`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportPeriod {
    /// No interim disclosure yet; the annual report is the latest figure
    #[display("NONE")]
    None,
    /// First-quarter report
    Q1,
    /// Half-year report
    H1,
    /// Third-quarter report
    Q3,
}

impl ReportPeriod {
    /// Latest interim period disclosed strictly before `as_of`.
    ///
    /// The most advanced period is checked first, so with chronological
    /// disclosure dates the result is the latest report the market could
    /// have seen. A report dated exactly on `as_of` is not yet known.
    pub fn resolve(
        q1: Option<NaiveDate>,
        h1: Option<NaiveDate>,
        q3: Option<NaiveDate>,
        as_of: NaiveDate,
    ) -> Self {
        let disclosed = |date: Option<NaiveDate>| date.is_some_and(|d| as_of > d);

        if disclosed(q3) {
            Self::Q3
        } else if disclosed(h1) {
            Self::H1
        } else if disclosed(q1) {
            Self::Q1
        } else {
            Self::None
        }
    }
}
