//! Process-wide configuration.
//!
//! The dashboard this core serves used to stash its settings in ambient
//! browser storage; here every knob lives in one [`LensConfig`] value that the
//! application entry point constructs once and passes into the session. No
//! code deeper in the crate reads global state after construction.

use crate::regime::LabelMode;
use serde::{Deserialize, Serialize};

/// Default regime count when no override is supplied.
pub const DEFAULT_K: u32 = 3;
/// Smallest regime count the session will request from the model.
pub const MIN_K: u32 = 2;
/// Largest regime count the session will request from the model.
pub const MAX_K: u32 = 5;

/// Configuration for a [`RegimeSession`](crate::regime::session::RegimeSession)
/// and the surrounding analytics.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub struct LensConfig {
    /// Regime count the session starts at.
    pub default_k: u32,
    /// Inclusive lower bound on requestable regime counts.
    pub min_k: u32,
    /// Inclusive upper bound on requestable regime counts.
    pub max_k: u32,
    /// Label column the session reads at startup.
    pub default_mode: LabelMode,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            default_k: DEFAULT_K,
            min_k: MIN_K,
            max_k: MAX_K,
            default_mode: LabelMode::Exact,
        }
    }
}

impl LensConfig {
    /// Build a configuration from defaults plus environment overrides
    /// (`FACTOR_LENS_DEFAULT_K`, `FACTOR_LENS_MIN_K`, `FACTOR_LENS_MAX_K`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_k: env_u32("FACTOR_LENS_DEFAULT_K").unwrap_or(defaults.default_k),
            min_k: env_u32("FACTOR_LENS_MIN_K").unwrap_or(defaults.min_k),
            max_k: env_u32("FACTOR_LENS_MAX_K").unwrap_or(defaults.max_k),
            default_mode: defaults.default_mode,
        }
    }

    /// Whether `k` is a regime count this configuration permits.
    pub fn k_in_bounds(&self, k: u32) -> bool {
        (self.min_k..=self.max_k).contains(&k)
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
