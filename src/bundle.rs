//! Tangent bundle estimation: one local frame per neighborhood.
//!
//! For every column j of a [`NeighborhoodGraph`] the estimator gathers the
//! member points, anchors them at a base point (a caller-supplied center or
//! the member centroid) and fits a d-dimensional orthonormal basis with the
//! local subspace fitter.
//!
//! Degenerate neighborhoods (fewer than two members, or members that all
//! coincide) never fail the batch. They produce a
//! [`TangentEstimate::Degenerate`] carrying the canonical basis `eye(D, d)`,
//! meaning "tangent undefined here, fall back to the ambient axes".

use log::{debug, info, trace, warn};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::data::PointCloud;
use crate::distance::euclidean;
use crate::error::{Result, TangentError};
use crate::neighborhood::NeighborhoodGraph;
use crate::subspace::{SubspaceMethod, check_target_dim};

/// Anchor point plus orthonormal basis [D, d] of a local chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TangentFrame {
    pub base_point: DVector<f64>,
    pub basis: DMatrix<f64>,
}

impl TangentFrame {
    /// First d standard axes of ℝ^D, anchored at `base_point`.
    pub fn canonical(base_point: DVector<f64>, d: usize) -> Self {
        let dim = base_point.len();
        Self {
            base_point,
            basis: DMatrix::identity(dim, d),
        }
    }

    pub fn ambient_dim(&self) -> usize {
        self.basis.nrows()
    }

    pub fn tangent_dim(&self) -> usize {
        self.basis.ncols()
    }

    /// Orthogonal projection of `x` onto the affine tangent plane.
    pub fn project(&self, x: &DVector<f64>) -> DVector<f64> {
        let offset = x - &self.base_point;
        let coeffs = self.basis.transpose() * offset;
        &self.base_point + &self.basis * coeffs
    }

    /// Distance from `x` to the affine tangent plane.
    pub fn residual(&self, x: &DVector<f64>) -> f64 {
        euclidean(x, &self.project(x))
    }
}

/// Tagged outcome of a single neighborhood estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum TangentEstimate {
    /// Basis fitted from at least two distinct members.
    Fitted(TangentFrame),
    /// No variance direction was available; the frame carries the canonical
    /// basis. `members` is the neighborhood size that triggered the fallback.
    Degenerate { frame: TangentFrame, members: usize },
}

impl TangentEstimate {
    pub fn frame(&self) -> &TangentFrame {
        match self {
            TangentEstimate::Fitted(frame) => frame,
            TangentEstimate::Degenerate { frame, .. } => frame,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, TangentEstimate::Degenerate { .. })
    }

    pub fn into_frame(self) -> TangentFrame {
        match self {
            TangentEstimate::Fitted(frame) => frame,
            TangentEstimate::Degenerate { frame, .. } => frame,
        }
    }
}

/// Immutable, index-aligned sequence of estimates; entry j ↔ graph column j.
#[derive(Debug, Clone, PartialEq)]
pub struct TangentBundle {
    estimates: Vec<TangentEstimate>,
    ambient_dim: usize,
    tangent_dim: usize,
}

impl TangentBundle {
    pub fn new(estimates: Vec<TangentEstimate>, ambient_dim: usize, tangent_dim: usize) -> Self {
        Self {
            estimates,
            ambient_dim,
            tangent_dim,
        }
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn ambient_dim(&self) -> usize {
        self.ambient_dim
    }

    pub fn tangent_dim(&self) -> usize {
        self.tangent_dim
    }

    pub fn get(&self, j: usize) -> Option<&TangentEstimate> {
        self.estimates.get(j)
    }

    pub fn frame(&self, j: usize) -> &TangentFrame {
        self.estimates[j].frame()
    }

    pub fn estimates(&self) -> &[TangentEstimate] {
        &self.estimates
    }

    pub fn frames(&self) -> impl Iterator<Item = &TangentFrame> + '_ {
        self.estimates.iter().map(TangentEstimate::frame)
    }

    pub fn n_degenerate(&self) -> usize {
        self.estimates.iter().filter(|e| e.is_degenerate()).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "TangentBundle: m={}, D={}, d={}, degenerate={}",
            self.len(),
            self.ambient_dim,
            self.tangent_dim,
            self.n_degenerate()
        )
    }
}

/// Estimates the d-dimensional tangent bundle over `graph` with covariance PCA.
pub fn tangent_bundle(
    graph: &NeighborhoodGraph,
    points: &PointCloud,
    d: usize,
    centers: Option<&PointCloud>,
) -> Result<TangentBundle> {
    tangent_bundle_with(graph, points, d, centers, SubspaceMethod::Covariance)
}

/// As [`tangent_bundle`], choosing the subspace fitting route.
pub fn tangent_bundle_with(
    graph: &NeighborhoodGraph,
    points: &PointCloud,
    d: usize,
    centers: Option<&PointCloud>,
    method: SubspaceMethod,
) -> Result<TangentBundle> {
    let dim = points.dim();
    let m = graph.n_neighborhoods();
    validate_inputs(graph, points, d, centers)?;

    info!(
        "Estimating tangent bundle: m={} neighborhoods, D={}, d={}, method={:?}, centers={}",
        m,
        dim,
        d,
        method,
        centers.is_some()
    );

    let estimates: Vec<TangentEstimate> = (0..m)
        .into_par_iter()
        .map(|j| estimate_one(graph, points, d, centers, method, j))
        .collect::<Result<_>>()?;

    let bundle = TangentBundle::new(estimates, dim, d);
    let degenerate = bundle.n_degenerate();
    if degenerate > 0 {
        warn!(
            "{} of {} neighborhoods were degenerate; canonical basis substituted",
            degenerate, m
        );
    }
    debug!("{}", bundle.summary());
    Ok(bundle)
}

fn validate_inputs(
    graph: &NeighborhoodGraph,
    points: &PointCloud,
    d: usize,
    centers: Option<&PointCloud>,
) -> Result<()> {
    let dim = points.dim();
    check_target_dim(d, dim)?;
    if graph.n_points() != points.n_points() {
        return Err(TangentError::ShapeMismatch {
            what: "graph rows vs point count",
            expected: points.n_points(),
            got: graph.n_points(),
        });
    }
    if let Some(c) = centers {
        if c.dim() != dim {
            return Err(TangentError::ShapeMismatch {
                what: "center dimension",
                expected: dim,
                got: c.dim(),
            });
        }
        if c.n_points() != graph.n_neighborhoods() {
            return Err(TangentError::ShapeMismatch {
                what: "center count vs neighborhoods",
                expected: graph.n_neighborhoods(),
                got: c.n_points(),
            });
        }
    }
    Ok(())
}

fn estimate_one(
    graph: &NeighborhoodGraph,
    points: &PointCloud,
    d: usize,
    centers: Option<&PointCloud>,
    method: SubspaceMethod,
    j: usize,
) -> Result<TangentEstimate> {
    let members = graph.members(j);

    // Base point: supplied center, else member centroid, else the landmark.
    let base_point = match centers {
        Some(c) => c.point(j),
        None => points
            .mean_of(members)
            .unwrap_or_else(|| points.point(graph.landmarks()[j])),
    };

    if members.len() < 2 {
        trace!("neighborhood {}: {} member(s), canonical fallback", j, members.len());
        return Ok(TangentEstimate::Degenerate {
            frame: TangentFrame::canonical(base_point, d),
            members: members.len(),
        });
    }

    let mut centered = points.select(members);
    let anchor = base_point.transpose();
    for mut row in centered.row_iter_mut() {
        row -= &anchor;
    }

    let fit = method.fit(&centered, d)?;
    if fit.is_degenerate() {
        trace!("neighborhood {}: coincident members, canonical fallback", j);
        return Ok(TangentEstimate::Degenerate {
            frame: TangentFrame::canonical(base_point, d),
            members: members.len(),
        });
    }

    trace!(
        "neighborhood {}: {} members, leading λ={:.4e}",
        j,
        members.len(),
        fit.eigenvalues[0]
    );
    Ok(TangentEstimate::Fitted(TangentFrame {
        base_point,
        basis: fit.components,
    }))
}
