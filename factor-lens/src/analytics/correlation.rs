//! Pairwise Pearson correlation over the numeric columns of a [`Table`].

use crate::error::LensError;
use crate::table::Table;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Symmetric factor correlation matrix.
///
/// Invariants: square, diagonal exactly `1.0`, `values[i][j] == values[j][i]`,
/// every entry in `[-1, 1]`. Cells whose coefficient is undefined (fewer than
/// two paired samples, or zero variance on either side) hold the sentinel
/// `0.0` so rendering never needs to special-case them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CorrelationMatrix {
    /// Factor names labeling both axes.
    pub factors: Vec<SmolStr>,
    /// Coefficient per factor pair, indexed `[row][col]` in `factors` order.
    pub correlation_matrix: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Number of factors on each axis.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Coefficient for the cell `[row][col]`, if both indices are in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.correlation_matrix.get(row)?.get(col).copied()
    }
}

/// Compute the pairwise Pearson correlation matrix over `columns`.
///
/// Missing and non-finite values are dropped pairwise, independently per pair,
/// so two cells may be computed over different row subsets. The diagonal is
/// set to `1.0` without computation.
///
/// Fails with [`LensError::InvalidInput`] when a requested column does not
/// exist; an empty column list yields an empty matrix.
pub fn correlate(table: &Table, columns: &[SmolStr]) -> Result<CorrelationMatrix, LensError> {
    let mut series = Vec::with_capacity(columns.len());
    for name in columns {
        let values = table
            .column(name)
            .ok_or_else(|| LensError::invalid_input(format!("unknown column: {name}")))?;
        series.push(values);
    }

    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for ((i, a), (j, b)) in series.iter().enumerate().tuple_combinations() {
        let r = pearson(a, b);
        matrix[i][j] = r;
        matrix[j][i] = r;
    }

    Ok(CorrelationMatrix {
        factors: columns.to_vec(),
        correlation_matrix: matrix,
    })
}

/// Pearson r over the rows where both values are present and finite.
///
/// Returns the sentinel `0.0` for fewer than two usable pairs or zero
/// variance on either side.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let paired: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if paired.len() < 2 {
        return 0.0;
    }

    let n = paired.len() as f64;
    let mean_a = paired.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = paired.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut num = 0.0;
    let mut denom_a = 0.0;
    let mut denom_b = 0.0;

    for (x, y) in &paired {
        let dx = x - mean_a;
        let dy = y - mean_b;
        num += dx * dy;
        denom_a += dx * dx;
        denom_b += dy * dy;
    }

    let denom = (denom_a * denom_b).sqrt();
    if denom > 0.0 {
        (num / denom).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
