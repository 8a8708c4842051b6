//! Return-series normalization for cross-asset comparability.

/// Fold per-period returns into a cumulative growth series.
///
/// `c_t = c_{t-1} * (1 + r_t)`, seeded at `1.0`. Missing returns are treated
/// as flat periods (`r_t = 0`). Output length equals input length.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<f64> {
    let mut cumulative = 1.0;
    returns
        .iter()
        .map(|r| {
            cumulative *= 1.0 + r.unwrap_or(0.0);
            cumulative
        })
        .collect()
}

/// Rescale a series so its first value becomes `1.0`.
///
/// A missing, zero or non-finite first value poisons the whole output with
/// `NaN` instead of raising: this is a display-only transform and a poisoned
/// series is visually obvious. Interior missing values map to `NaN`
/// individually.
pub fn normalize_to_first(values: &[Option<f64>]) -> Vec<f64> {
    let first = values.first().copied().flatten().unwrap_or(0.0);
    if first == 0.0 || !first.is_finite() {
        return vec![f64::NAN; values.len()];
    }

    values
        .iter()
        .map(|v| v.map_or(f64::NAN, |v| v / first))
        .collect()
}
