//! Regime session state machine.
//!
//! Orchestrates the regime path: current regime count `k`, labeling mode, a
//! date-filtered view of the active [`RegimeSeries`], and the round trip to
//! the external rebuild collaborator. Everything runs on one logical thread
//! of control; the only suspension points are the awaited collaborator calls.
//!
//! Changing `k` is single-flight: at most one rebuild round trip is in the
//! air per session. A `set_k` issued while one is in flight only re-aims the
//! target; the stale response is detected on arrival (its `k` no longer
//! matches the target) and dropped rather than applied.

use crate::config::LensConfig;
use crate::error::LensError;
use crate::regime::segment::segment;
use crate::regime::{LabelMode, RegimeSegment, RegimeSeries};
use crate::source::RegimeSource;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Outcome of [`RegimeSession::begin_set_k`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SetKAction {
    /// No rebuild was in flight: the caller runs the collaborator round trip
    /// for this `k` and reports back via [`RegimeSession::complete_set_k`].
    Begin(u32),
    /// A rebuild is already in flight: no second collaborator call is issued;
    /// the in-flight result will be dropped on arrival and this `k` started.
    Supersede(u32),
    /// The requested `k` is already current.
    Noop,
}

/// Read-only view of the session for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub k: u32,
    pub mode: LabelMode,
    pub filtered: RegimeSeries,
    pub is_rebuilding: bool,
    pub last_error: Option<LensError>,
}

/// State machine holding the current regime count, labeling mode and the
/// date-filtered view derived from the active base series.
///
/// `filtered` is always derived from the *current* base: adopting a new base
/// (after a successful rebuild) re-derives it under the active date-range
/// override, and a pending derivation keyed to a replaced base never leaks
/// through.
#[derive(Debug)]
pub struct RegimeSession {
    config: LensConfig,
    k: u32,
    mode: LabelMode,
    date_range: Option<(Option<NaiveDate>, Option<NaiveDate>)>,
    base: RegimeSeries,
    filtered: RegimeSeries,
    rebuilding: bool,
    target_k: u32,
    last_error: Option<LensError>,
}

impl RegimeSession {
    /// Session in its initial idle state with an empty base series.
    pub fn new(config: LensConfig) -> Self {
        let k = config.default_k;
        let mode = config.default_mode;
        Self {
            config,
            k,
            mode,
            date_range: None,
            base: RegimeSeries::default(),
            filtered: RegimeSeries::default(),
            rebuilding: false,
            target_k: k,
            last_error: None,
        }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn mode(&self) -> LabelMode {
        self.mode
    }

    /// Whether a rebuild round trip is in flight. Callers use this to disable
    /// the `k` control surface until the in-flight request settles.
    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding
    }

    pub fn last_error(&self) -> Option<&LensError> {
        self.last_error.as_ref()
    }

    /// The active base series, unfiltered.
    pub fn base(&self) -> &RegimeSeries {
        &self.base
    }

    /// The current date-filtered view.
    pub fn filtered(&self) -> &RegimeSeries {
        &self.filtered
    }

    /// Read-only snapshot for presentation layers.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            k: self.k,
            mode: self.mode,
            filtered: self.filtered.clone(),
            is_rebuilding: self.rebuilding,
            last_error: self.last_error.clone(),
        }
    }

    /// Run-length segments of the current view under the current mode.
    pub fn segments(&self) -> Vec<RegimeSegment> {
        segment(&self.filtered, self.mode)
    }

    /// Request a change of regime count.
    ///
    /// From idle this marks the session rebuilding and hands the caller the
    /// `k` to run the collaborator round trip for. While a rebuild is in
    /// flight it only re-aims the target (single-flight): the in-flight
    /// response will be dropped on arrival and the caller told to start the
    /// superseding one.
    pub fn begin_set_k(&mut self, k: u32) -> Result<SetKAction, LensError> {
        if !self.config.k_in_bounds(k) {
            return Err(LensError::invalid_input(format!(
                "k={} outside configured bounds [{}, {}]",
                k, self.config.min_k, self.config.max_k
            )));
        }

        if self.rebuilding {
            info!(target_k = k, "superseding in-flight rebuild target");
            self.target_k = k;
            return Ok(SetKAction::Supersede(k));
        }

        if k == self.k {
            return Ok(SetKAction::Noop);
        }

        info!(from_k = self.k, to_k = k, "starting regime rebuild");
        self.rebuilding = true;
        self.target_k = k;
        Ok(SetKAction::Begin(k))
    }

    /// Report the settled collaborator round trip for `k`.
    ///
    /// A response for a superseded `k` is dropped, and the pending target is
    /// returned so the caller starts its round trip next (the settled flight
    /// frees the single-flight slot). On success the new series replaces the
    /// base wholesale; on failure the previous `k` and data are retained and
    /// the error surfaced through the snapshot.
    pub fn complete_set_k(
        &mut self,
        k: u32,
        result: Result<RegimeSeries, LensError>,
    ) -> Option<u32> {
        if !self.rebuilding {
            warn!(k, "dropping rebuild completion with no rebuild in flight");
            return None;
        }

        if k != self.target_k {
            warn!(
                stale_k = k,
                target_k = self.target_k,
                "dropping superseded rebuild result"
            );
            return Some(self.target_k);
        }

        self.rebuilding = false;
        match result {
            Ok(series) => {
                if let Err(err) = self.adopt_base(k, series) {
                    warn!(k, %err, "rejected rebuilt regime series");
                    self.last_error = Some(err);
                }
            }
            Err(err) => {
                warn!(k, %err, "rebuild failed; retaining previous regime data");
                self.last_error = Some(err);
            }
        }
        None
    }

    /// Change `k` through the full rebuild round trip against `source`,
    /// driving [`RegimeSession::begin_set_k`] / [`RegimeSession::complete_set_k`].
    pub async fn set_k<S>(&mut self, source: &S, k: u32) -> Result<(), LensError>
    where
        S: RegimeSource,
    {
        let mut next = match self.begin_set_k(k)? {
            SetKAction::Begin(k) => k,
            SetKAction::Supersede(_) | SetKAction::Noop => return Ok(()),
        };

        loop {
            let result = rebuild_and_fetch(source, next).await;
            match self.complete_set_k(next, result) {
                Some(pending) => next = pending,
                None => break,
            }
        }

        match &self.last_error {
            Some(err) if self.k != k => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// Fetch the series for the session's current `k` and adopt it as base.
    /// Used for the initial population; no model rebuild is requested.
    pub async fn load<S>(&mut self, source: &S) -> Result<(), LensError>
    where
        S: RegimeSource,
    {
        if self.rebuilding {
            return Err(LensError::invalid_input(
                "cannot load while a rebuild is in flight",
            ));
        }

        match source.fetch_regime_series(self.k).await {
            Ok(series) => match self.adopt_base(self.k, series) {
                Ok(()) => Ok(()),
                Err(err) => {
                    self.last_error = Some(err.clone());
                    Err(err)
                }
            },
            Err(err) => {
                warn!(k = self.k, %err, "initial regime load failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Switch which label column downstream segmentation reads. Both columns
    /// are already present in the base series, so no rebuild is required; the
    /// filtered view is re-derived from the base immediately.
    pub fn set_mode(&mut self, mode: LabelMode) {
        if self.mode != mode {
            debug!(%mode, "switching label mode");
        }
        self.mode = mode;
        self.refilter();
    }

    /// Apply an explicit inclusive date-range override to the view. Touches
    /// only `filtered`; the base series and `k` are left alone.
    pub fn apply_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.date_range = Some((start, end));
        self.refilter();
    }

    /// Clear any date-range override, reverting the view to the base series'
    /// own first/last bounds. Idempotent.
    pub fn reset_date_range(&mut self) {
        self.date_range = None;
        self.filtered = self.base.clone();
    }

    /// Validate and install a freshly fetched series as the new base, then
    /// re-derive the view from it.
    fn adopt_base(&mut self, k: u32, series: RegimeSeries) -> Result<(), LensError> {
        series.validate()?;
        if series.k != k {
            return Err(LensError::invalid_input(format!(
                "fetched series is for k={} but k={} was requested",
                series.k, k
            )));
        }

        info!(k, rows = series.len(), "adopting regime series");
        self.base = series;
        self.k = k;
        self.target_k = k;
        self.last_error = None;
        self.refilter();
        Ok(())
    }

    fn refilter(&mut self) {
        match self.date_range {
            Some((start, end)) => {
                // the base was validated on adoption, so filtering it cannot
                // fail; surface the error instead of crashing if it ever does
                match self.base.filter_by_date(start, end) {
                    Ok(filtered) => self.filtered = filtered,
                    Err(err) => self.last_error = Some(err),
                }
            }
            None => self.filtered = self.base.clone(),
        }
    }
}

async fn rebuild_and_fetch<S>(source: &S, k: u32) -> Result<RegimeSeries, LensError>
where
    S: RegimeSource,
{
    source.rebuild_regime_model(k).await?;
    source.fetch_regime_series(k).await
}
