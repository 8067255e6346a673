//! Local subspace fitting: PCA and its distance-based dual, classical MDS.
//!
//! PCA diagonalises the sample covariance `XcᵀXc / (k−1)` of a point set.
//! Classical (Torgerson) MDS diagonalises the double-centred Gram matrix
//! `B = −½ J G J` built from squared pairwise distances `G`. For Euclidean
//! input `B = XcXcᵀ`, so both routes minimise the same strain objective and
//! produce the same d-dimensional embedding up to rotation/reflection.
//!
//! Both operate through `nalgebra::SymmetricEigen`, whose output is unsorted;
//! every routine here sorts eigenpairs by decreasing eigenvalue.

use log::trace;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TangentError};
use crate::predicates::{is_distance_matrix, squareform};

/// Eigenvalue floor, relative to the leading eigenvalue (or to the largest
/// Gram entry for CMDS), under which a direction carries no variance.
pub const EIGEN_FLOOR: f64 = 1e-12;

/// Top-d eigenpairs of a local fit.
#[derive(Debug, Clone, PartialEq)]
pub struct SubspaceFit {
    /// Leading eigenvalues, decreasing, clamped at zero. Length d.
    pub eigenvalues: DVector<f64>,
    /// Orthonormal directions as columns. [D, d] for PCA, [n, d] for CMDS.
    pub components: DMatrix<f64>,
    /// Number of samples the fit was computed from.
    pub n_samples: usize,
    degenerate: bool,
}

impl SubspaceFit {
    pub fn dim(&self) -> usize {
        self.components.ncols()
    }

    /// No variance direction is defined: fewer than two samples, or all
    /// samples coincide.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Which dual route computes a tangent basis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubspaceMethod {
    /// Eigenvectors of the D×D covariance.
    #[default]
    Covariance,
    /// Eigenvectors of the k×k Gram matrix, lifted back to ambient space.
    /// Cheaper when neighborhoods are much smaller than the ambient dimension.
    Gram,
}

impl SubspaceMethod {
    /// Fits a d-dimensional subspace to the rows of `points` [k, D] and returns
    /// an ambient basis [D, d].
    pub fn fit(&self, points: &DMatrix<f64>, d: usize) -> Result<SubspaceFit> {
        match self {
            SubspaceMethod::Covariance => pca(points, d),
            SubspaceMethod::Gram => gram_basis(points, d),
        }
    }
}

pub(crate) fn check_target_dim(d: usize, available: usize) -> Result<()> {
    if d == 0 {
        return Err(TangentError::ZeroDimension);
    }
    if d > available {
        return Err(TangentError::DimensionTooLarge {
            requested: d,
            available,
        });
    }
    Ok(())
}

/// Eigendecomposition of a symmetric matrix, eigenpairs sorted by decreasing
/// eigenvalue.
pub fn sorted_symmetric_eigen(m: DMatrix<f64>) -> (Vec<f64>, DMatrix<f64>) {
    let n = m.nrows();
    let eig = SymmetricEigen::new(m);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));
    let values = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let vectors = DMatrix::from_fn(n, n, |r, c| eig.eigenvectors[(r, order[c])]);
    (values, vectors)
}

fn center_rows(points: &DMatrix<f64>) -> DMatrix<f64> {
    let mut centered = points.clone();
    if points.nrows() == 0 {
        return centered;
    }
    let mean = points.row_mean();
    for mut row in centered.row_iter_mut() {
        row -= &mean;
    }
    centered
}

/// All rows coincide: the mean-centred spread is within the rounding error
/// of the mean itself.
fn rows_coincide(points: &DMatrix<f64>, centered: &DMatrix<f64>) -> bool {
    let k = points.nrows().max(1) as f64;
    centered.amax() <= k * f64::EPSILON * points.amax()
}

/// Sample covariance of the rows of `points` [k, D], `(k−1)` normalised.
/// Returns the zero matrix for fewer than two rows.
pub fn covariance(points: &DMatrix<f64>) -> DMatrix<f64> {
    scatter(&center_rows(points))
}

fn scatter(centered: &DMatrix<f64>) -> DMatrix<f64> {
    let (k, dim) = centered.shape();
    if k < 2 {
        return DMatrix::zeros(dim, dim);
    }
    (centered.transpose() * centered) / (k as f64 - 1.0)
}

/// Principal directions of the rows of `points` [k, D].
///
/// The covariance is always mean-centred, so translating the input does not
/// change the returned directions.
pub fn pca(points: &DMatrix<f64>, d: usize) -> Result<SubspaceFit> {
    let (k, dim) = points.shape();
    check_target_dim(d, dim)?;

    let centered = center_rows(points);
    let (values, vectors) = sorted_symmetric_eigen(scatter(&centered));
    let eigenvalues = DVector::from_iterator(d, values.iter().take(d).map(|v| v.max(0.0)));
    let components = vectors.columns(0, d).into_owned();

    let degenerate = k < 2 || rows_coincide(points, &centered);
    trace!(
        "pca: k={}, D={}, d={}, leading λ={:.3e}, degenerate={}",
        k, dim, d, eigenvalues[0], degenerate
    );

    Ok(SubspaceFit {
        eigenvalues,
        components,
        n_samples: k,
        degenerate,
    })
}

/// PCA embedding coordinates [k, d]: `X · V_d`, with `X` mean-centred first
/// when `center` is set.
pub fn pca_coords(points: &DMatrix<f64>, d: usize, center: bool) -> Result<DMatrix<f64>> {
    let fit = pca(points, d)?;
    let x = if center {
        center_rows(points)
    } else {
        points.clone()
    };
    Ok(x * fit.components)
}

/// Double-centres a squared-distance matrix into a Gram matrix:
/// `B = −½ (G − 1·μᵀ − μ·1ᵀ + μ̄)` where `μ` are the column means.
pub fn double_center(sq_dists: &DMatrix<f64>) -> DMatrix<f64> {
    let n = sq_dists.nrows();
    let col_means = sq_dists.row_mean();
    let grand = col_means.mean();
    DMatrix::from_fn(n, n, |i, j| -0.5 * (sq_dists[(i, j)] - col_means[j] - col_means[i] + grand))
}

/// Top-d eigenpairs of the double-centred Gram matrix of `sq_dists` [n, n].
///
/// Non-positive eigenvalues (possible for non-Euclidean or noisy input) are
/// clamped to zero so they contribute nothing to an embedding.
pub fn cmds_eigen(sq_dists: &DMatrix<f64>, d: usize) -> Result<SubspaceFit> {
    if !is_distance_matrix(sq_dists) {
        return Err(TangentError::NotADistanceMatrix);
    }
    let n = sq_dists.nrows();
    check_target_dim(d, n)?;

    let gram = double_center(sq_dists);
    let gram_scale = gram.amax();
    let (values, vectors) = sorted_symmetric_eigen(gram);
    let eigenvalues = DVector::from_iterator(d, values.iter().take(d).map(|v| v.max(0.0)));
    let components = vectors.columns(0, d).into_owned();
    let degenerate = n < 2 || eigenvalues[0] <= EIGEN_FLOOR * gram_scale;

    Ok(SubspaceFit {
        eigenvalues,
        components,
        n_samples: n,
        degenerate,
    })
}

/// Classical MDS coordinates [n, d]: `V_d · diag(√λ_d)`.
pub fn cmds(sq_dists: &DMatrix<f64>, d: usize) -> Result<DMatrix<f64>> {
    let fit = cmds_eigen(sq_dists, d)?;
    let scale = DMatrix::from_diagonal(&fit.eigenvalues.map(f64::sqrt));
    Ok(fit.components * scale)
}

/// Classical MDS from a condensed vector of squared pairwise distances.
pub fn cmds_condensed(sq_pairwise: &[f64], d: usize) -> Result<DMatrix<f64>> {
    cmds(&squareform(sq_pairwise)?, d)
}

/// Ambient basis [D, d] computed through the Gram dual.
///
/// Each Gram eigenvector `u` with eigenvalue `λ > 0` maps to the ambient unit
/// direction `Xcᵀ u / √λ`. Directions with no support are completed from the
/// standard axes so the basis always has d orthonormal columns.
fn gram_basis(points: &DMatrix<f64>, d: usize) -> Result<SubspaceFit> {
    let (k, dim) = points.shape();
    check_target_dim(d, dim)?;
    if k == 0 {
        return Ok(SubspaceFit {
            eigenvalues: DVector::zeros(d),
            components: DMatrix::identity(dim, d),
            n_samples: 0,
            degenerate: true,
        });
    }

    let centered = center_rows(points);
    let gram = &centered * centered.transpose();
    let (values, vectors) = sorted_symmetric_eigen(gram);
    let coincide = k < 2 || rows_coincide(points, &centered);
    let floor = EIGEN_FLOOR * values.first().copied().unwrap_or(0.0);

    let mut columns: Vec<DVector<f64>> = Vec::with_capacity(d);
    let mut eigenvalues = DVector::<f64>::zeros(d);
    for (i, &lambda) in values.iter().enumerate().take(d.min(k)) {
        if coincide || lambda <= floor || lambda <= 0.0 {
            break;
        }
        let lifted = centered.transpose() * vectors.column(i) / lambda.sqrt();
        eigenvalues[i] = lambda / (k as f64 - 1.0);
        columns.push(lifted.normalize());
    }

    let degenerate = coincide || columns.is_empty();
    let components = complete_orthonormal(columns, dim, d);
    Ok(SubspaceFit {
        eigenvalues,
        components,
        n_samples: k,
        degenerate,
    })
}

/// Extends orthonormal `columns` to d columns with Gram–Schmidt over the
/// standard axes of ℝ^dim.
fn complete_orthonormal(mut columns: Vec<DVector<f64>>, dim: usize, d: usize) -> DMatrix<f64> {
    for axis in 0..dim {
        if columns.len() >= d {
            break;
        }
        let mut candidate = DVector::<f64>::zeros(dim);
        candidate[axis] = 1.0;
        for c in &columns {
            let proj = c.dot(&candidate);
            candidate -= c * proj;
        }
        let norm = candidate.norm();
        if norm > 1e-8 {
            columns.push(candidate / norm);
        }
    }
    DMatrix::from_columns(&columns)
}
