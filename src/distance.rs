//! Distance primitives used by the graph builder, the dual fitter and the
//! cosine weights.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::data::PointCloud;

/// Euclidean distance between rows `i` of `a` and `j` of `b`.
#[inline]
pub fn row_distance(a: &DMatrix<f64>, i: usize, b: &DMatrix<f64>, j: usize) -> f64 {
    squared_row_distance(a, i, b, j).sqrt()
}

#[inline]
pub fn squared_row_distance(a: &DMatrix<f64>, i: usize, b: &DMatrix<f64>, j: usize) -> f64 {
    debug_assert_eq!(a.ncols(), b.ncols());
    (0..a.ncols())
        .map(|c| {
            let diff = a[(i, c)] - b[(j, c)];
            diff * diff
        })
        .sum()
}

/// Cross distances [N, M] between every point of `x` and every point of `y`.
pub fn cdist(x: &PointCloud, y: &PointCloud) -> DMatrix<f64> {
    let (xc, yc) = (x.coords(), y.coords());
    let cols: Vec<Vec<f64>> = (0..y.n_points())
        .into_par_iter()
        .map(|j| (0..x.n_points()).map(|i| row_distance(xc, i, yc, j)).collect())
        .collect();
    DMatrix::from_fn(x.n_points(), y.n_points(), |i, j| cols[j][i])
}

/// Symmetric matrix of squared Euclidean distances [N, N] with a zero diagonal.
pub fn squared_distance_matrix(x: &PointCloud) -> DMatrix<f64> {
    let c = x.coords();
    let n = x.n_points();
    let mut out = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d2 = squared_row_distance(c, i, c, j);
            out[(i, j)] = d2;
            out[(j, i)] = d2;
        }
    }
    out
}

/// Cosine distance `1 - <u, v> / (|u| |v|)` over raw slices.
///
/// Zero-norm inputs yield `NaN`, matching the usual convention for an
/// undefined angle.
pub fn cosine_distance(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len());
    let (mut dot, mut nu, mut nv) = (0.0, 0.0, 0.0);
    for (a, b) in u.iter().zip(v) {
        dot += a * b;
        nu += a * a;
        nv += b * b;
    }
    1.0 - dot / (nu.sqrt() * nv.sqrt())
}

/// Sign-invariant cosine distance: `min(cos_dist(u, v), cos_dist(-u, v))`.
///
/// Eigenvector signs are arbitrary, so bases are compared up to a global flip.
pub fn unsigned_cosine_distance(u: &[f64], v: &[f64]) -> f64 {
    let flipped: Vec<f64> = u.iter().map(|a| -a).collect();
    cosine_distance(u, v).min(cosine_distance(&flipped, v))
}

/// Euclidean norm of `a - b`.
#[inline]
pub fn euclidean(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    (a - b).norm()
}
