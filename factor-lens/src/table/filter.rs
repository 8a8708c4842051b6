//! Time-window filtering over [`Table`] snapshots.
//!
//! Two filter shapes: an explicit inclusive `[start, end]` date range, and a
//! relative lookback window ("last N days from now"). Both are pure and
//! non-mutating; an empty match is an empty `Table`, never an error.

use crate::error::LensError;
use crate::table::Table;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

impl Table {
    /// Rows with `start <= date <= end`, inclusive on both bounds. An absent
    /// bound leaves that side unbounded.
    ///
    /// Fails with [`LensError::InvalidInput`] only when the receiver's date
    /// axis is not strictly ascending, which is possible for tables built via
    /// deserialization rather than [`Table::new`].
    pub fn filter_by_date(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Table, LensError> {
        if !self.is_date_sorted() {
            return Err(LensError::invalid_input(
                "table date axis is not sorted ascending",
            ));
        }

        let dates = self.dates();
        let lo = start
            .map(|start| dates.partition_point(|date| *date < start))
            .unwrap_or(0);
        let hi = end
            .map(|end| dates.partition_point(|date| *date <= end))
            .unwrap_or(dates.len());
        let hi = hi.max(lo);

        let filtered = self.slice_rows(lo..hi);
        debug!(
            rows = filtered.len(),
            from = ?filtered.first_date(),
            to = ?filtered.last_date(),
            "applied date filter"
        );
        Ok(filtered)
    }

    /// Rows from the last `days` days, measured back from today (UTC).
    pub fn filter_by_lookback(&self, days: i64) -> Result<Table, LensError> {
        self.filter_by_lookback_from(days, Utc::now().date_naive())
    }

    /// Clock-injected form of [`Table::filter_by_lookback`].
    pub fn filter_by_lookback_from(
        &self,
        days: i64,
        today: NaiveDate,
    ) -> Result<Table, LensError> {
        let cutoff = today - Duration::days(days);
        self.filter_by_date(Some(cutoff), None)
    }

    /// Apply one of the dashboard timeframe presets.
    pub fn filter_by_timeframe(&self, timeframe: Timeframe) -> Result<Table, LensError> {
        match timeframe.lookback_days() {
            Some(days) => self.filter_by_lookback(days),
            None => self.filter_by_date(None, None),
        }
    }
}

/// Relative lookback presets offered by the dashboard timeframe tabs.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Deserialize, Serialize)]
pub enum Timeframe {
    /// Last 30 days.
    #[serde(rename = "1m")]
    M1,
    /// Last 90 days.
    #[serde(rename = "3m")]
    M3,
    /// Last 180 days.
    #[serde(rename = "6m")]
    M6,
    /// Last 365 days.
    #[serde(rename = "1y")]
    Y1,
    /// The full history.
    #[default]
    #[serde(rename = "all")]
    All,
}

impl Timeframe {
    /// Lookback window in days, or `None` for the full history.
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            Timeframe::M1 => Some(30),
            Timeframe::M3 => Some(90),
            Timeframe::M6 => Some(180),
            Timeframe::Y1 => Some(365),
            Timeframe::All => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M6 => "6m",
            Timeframe::Y1 => "1y",
            Timeframe::All => "all",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Timeframe::M1),
            "3m" => Ok(Timeframe::M3),
            "6m" => Ok(Timeframe::M6),
            "1y" => Ok(Timeframe::Y1),
            "all" => Ok(Timeframe::All),
            other => Err(LensError::invalid_input(format!(
                "unknown timeframe: {other}"
            ))),
        }
    }
}
