//! Shape predicates for distance-type inputs.

use nalgebra::DMatrix;

use crate::error::{Result, TangentError};

/// Square with an exactly zero diagonal.
pub fn is_distance_matrix(x: &DMatrix<f64>) -> bool {
    x.is_square() && (0..x.nrows()).all(|i| x[(i, i)] == 0.0)
}

/// Length is `n choose 2` for some integer `n`, i.e. a condensed upper triangle.
pub fn is_pairwise_distances(x: &[f64]) -> bool {
    inverse_choose(x.len()).is_some()
}

/// Non-empty, with every row of the same non-zero length.
pub fn is_point_cloud(rows: &[Vec<f64>]) -> bool {
    match rows.first() {
        Some(first) if !first.is_empty() => rows.iter().all(|r| r.len() == first.len()),
        _ => false,
    }
}

/// Solves `n (n - 1) / 2 == len` for `n`.
pub fn inverse_choose(len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    // n ≈ (1 + sqrt(1 + 8 len)) / 2; check the neighbours to absorb rounding.
    let approx = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    (approx.saturating_sub(1)..=approx + 1).find(|&n| n >= 2 && n * (n - 1) / 2 == len)
}

/// Expands a condensed upper-triangular distance vector into a full symmetric
/// matrix. Entries are ordered `(0,1), (0,2), …, (0,n-1), (1,2), …`.
pub fn squareform(condensed: &[f64]) -> Result<DMatrix<f64>> {
    let n = inverse_choose(condensed.len())
        .ok_or(TangentError::NotPairwiseDistances(condensed.len()))?;
    let mut out = DMatrix::<f64>::zeros(n, n);
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            out[(i, j)] = condensed[k];
            out[(j, i)] = condensed[k];
            k += 1;
        }
    }
    Ok(out)
}
