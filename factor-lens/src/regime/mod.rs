//! Market-regime series supplied by the external classification model.
//!
//! The core never fits the model itself: it consumes, validates, filters and
//! segments whatever the rebuild collaborator returns for a given regime
//! count `k`.

pub mod segment;
pub mod session;

use crate::error::LensError;
use chrono::NaiveDate;
use derive_more::Constructor;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Tolerance for per-row probability mass drifting away from 1.0.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Which label column of a [`RegimeSeries`] downstream consumers read.
///
/// Switching modes never requires a rebuild: both columns are present in the
/// series as fetched.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// Per-timestep labels exactly as emitted by the classification model.
    #[default]
    Exact,
    /// Rolling-mean smoothed labels, falling back to exact where absent.
    Smoothed,
}

impl LabelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelMode::Exact => "exact",
            LabelMode::Smoothed => "smoothed",
        }
    }
}

impl std::fmt::Display for LabelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One timestep of a [`RegimeSeries`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegimePoint {
    pub date: NaiveDate,
    /// Reference-asset price at this timestep.
    pub price: f64,
    /// Regime label assigned by the classification model, in `[0, k)`.
    pub label: u32,
    /// Rolling-mean smoothed label, when the model emitted one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothed: Option<u32>,
    /// Membership probability per regime index.
    #[serde(default)]
    pub probabilities: FnvHashMap<u32, f64>,
}

impl RegimePoint {
    /// Label read under `mode`. `Smoothed` falls back to the exact label for
    /// rows where the model emitted no smoothed value.
    pub fn label_for(&self, mode: LabelMode) -> u32 {
        match mode {
            LabelMode::Exact => self.label,
            LabelMode::Smoothed => self.smoothed.unwrap_or(self.label),
        }
    }

    /// Membership probability for `regime`, zero when absent.
    pub fn probability(&self, regime: u32) -> f64 {
        self.probabilities.get(&regime).copied().unwrap_or(0.0)
    }
}

/// Regime labels and membership probabilities for one model order `k`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RegimeSeries {
    /// Number of regimes the model was fitted with.
    pub k: u32,
    /// Per-timestep points, ascending by date.
    pub points: Vec<RegimePoint>,
}

impl RegimeSeries {
    /// Construct a series, validating it eagerly.
    pub fn new(k: u32, points: Vec<RegimePoint>) -> Result<Self, LensError> {
        let series = Self { k, points };
        series.validate()?;
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|point| point.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.date)
    }

    /// Check the series invariants: ascending dates, labels in `[0, k)`, and
    /// per-row probability mass of ≈ 1 over regime indices in `[0, k)`.
    pub fn validate(&self) -> Result<(), LensError> {
        if !self.is_date_sorted() {
            return Err(LensError::invalid_input(
                "regime series dates are not strictly ascending",
            ));
        }

        for point in &self.points {
            if point.label >= self.k {
                return Err(LensError::invalid_input(format!(
                    "label {} out of range for k={} at {}",
                    point.label, self.k, point.date
                )));
            }
            if let Some(smoothed) = point.smoothed {
                if smoothed >= self.k {
                    return Err(LensError::invalid_input(format!(
                        "smoothed label {} out of range for k={} at {}",
                        smoothed, self.k, point.date
                    )));
                }
            }

            if point.probabilities.is_empty() {
                continue;
            }
            let mut sum = 0.0;
            for (regime, probability) in &point.probabilities {
                if *regime >= self.k {
                    return Err(LensError::invalid_input(format!(
                        "probability for regime {} out of range for k={} at {}",
                        regime, self.k, point.date
                    )));
                }
                if !(0.0..=1.0 + PROBABILITY_SUM_TOLERANCE).contains(probability) {
                    return Err(LensError::invalid_input(format!(
                        "probability {} outside [0, 1] at {}",
                        probability, point.date
                    )));
                }
                sum += probability;
            }
            if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                return Err(LensError::invalid_input(format!(
                    "probabilities sum to {} at {}",
                    sum, point.date
                )));
            }
        }

        Ok(())
    }

    /// Points with `start <= date <= end`, inclusive on both bounds; an
    /// absent bound leaves that side unbounded.
    ///
    /// Fails with [`LensError::InvalidInput`] when the receiver's dates are
    /// not strictly ascending (possible via deserialization).
    pub fn filter_by_date(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<RegimeSeries, LensError> {
        if !self.is_date_sorted() {
            return Err(LensError::invalid_input(
                "regime series dates are not sorted ascending",
            ));
        }

        let lo = start
            .map(|start| self.points.partition_point(|point| point.date < start))
            .unwrap_or(0);
        let hi = end
            .map(|end| self.points.partition_point(|point| point.date <= end))
            .unwrap_or(self.points.len());
        let hi = hi.max(lo);

        Ok(RegimeSeries {
            k: self.k,
            points: self.points[lo..hi].to_vec(),
        })
    }

    fn is_date_sorted(&self) -> bool {
        self.points
            .windows(2)
            .all(|window| window[0].date < window[1].date)
    }
}

/// Contiguous run of equally-labeled timesteps, inclusive on both ends.
///
/// Produced by [`segment::segment`]; adjacent segments never share a label.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Constructor, Deserialize, Serialize)]
pub struct RegimeSegment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: u32,
}
