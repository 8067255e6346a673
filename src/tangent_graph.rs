//! One-pass tangent neighbor graph.
//!
//! Builds the `2r` neighborhood graph and, for every landmark, fits a tangent
//! basis to the members centred at the landmark point itself, then scores the
//! fit by the summed distance of the centred members to their orthogonal
//! projection onto the tangent plane.
//!
//! Neighborhoods with fewer than two distinct members cannot be fitted. They
//! get a [`LocalWeight::Unreliable`] weight and a canonical-basis estimate instead of
//! an error, so one isolated point never aborts the batch.

use log::{info, warn};
use nalgebra::DVector;
use rayon::prelude::*;

use crate::bundle::{TangentEstimate, TangentFrame};
use crate::data::PointCloud;
use crate::error::Result;
use crate::neighborhood::{NeighborhoodGraph, neighborhood_graph};
use crate::subspace::{check_target_dim, pca};

/// Per-landmark fit quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalWeight {
    /// Sum of member distances to the fitted tangent plane.
    Residual(f64),
    /// Too few distinct members for a tangent estimate.
    Unreliable,
}

impl LocalWeight {
    /// Plain numeric view: `Unreliable` maps to `+∞`.
    pub fn value(&self) -> f64 {
        match self {
            LocalWeight::Residual(r) => *r,
            LocalWeight::Unreliable => f64::INFINITY,
        }
    }

    pub fn is_reliable(&self) -> bool {
        matches!(self, LocalWeight::Residual(_))
    }
}

/// Output of [`tangent_neighbor_graph`], index-aligned on the landmarks.
#[derive(Debug, Clone)]
pub struct TangentNeighborGraph {
    pub graph: NeighborhoodGraph,
    pub weights: Vec<LocalWeight>,
    pub tangents: Vec<TangentEstimate>,
}

impl TangentNeighborGraph {
    /// Weights as plain numbers, `+∞` where unreliable.
    pub fn weight_values(&self) -> Vec<f64> {
        self.weights.iter().map(LocalWeight::value).collect()
    }

    pub fn n_unreliable(&self) -> usize {
        self.weights.iter().filter(|w| !w.is_reliable()).count()
    }
}

/// Builds the `2r` graph at `landmarks` and fits a d-dimensional tangent at
/// each landmark point.
pub fn tangent_neighbor_graph(
    points: &PointCloud,
    d: usize,
    radius: f64,
    landmarks: Option<&[usize]>,
) -> Result<TangentNeighborGraph> {
    let dim = points.dim();
    check_target_dim(d, dim)?;

    let graph = neighborhood_graph(points, radius, landmarks)?;
    let m = graph.n_neighborhoods();
    info!("Fitting tangent neighbor graph: m={}, D={}, d={}", m, dim, d);

    let fitted: Vec<(LocalWeight, TangentEstimate)> = (0..m)
        .into_par_iter()
        .map(|j| fit_landmark(&graph, points, d, j))
        .collect::<Result<_>>()?;
    let (weights, tangents): (Vec<_>, Vec<_>) = fitted.into_iter().unzip();

    let out = TangentNeighborGraph {
        graph,
        weights,
        tangents,
    };
    let unreliable = out.n_unreliable();
    if unreliable > 0 {
        warn!("{} of {} landmarks have fewer than two distinct neighbors", unreliable, m);
    }
    Ok(out)
}

fn fit_landmark(
    graph: &NeighborhoodGraph,
    points: &PointCloud,
    d: usize,
    j: usize,
) -> Result<(LocalWeight, TangentEstimate)> {
    let members = graph.members(j);
    let anchor = points.point(graph.landmarks()[j]);
    let unreliable = |anchor: DVector<f64>| {
        (
            LocalWeight::Unreliable,
            TangentEstimate::Degenerate {
                frame: TangentFrame::canonical(anchor, d),
                members: members.len(),
            },
        )
    };

    if members.len() < 2 {
        return Ok(unreliable(anchor));
    }

    let mut centered = points.select(members);
    let anchor_row = anchor.transpose();
    for mut row in centered.row_iter_mut() {
        row -= &anchor_row;
    }

    let fit = pca(&centered, d)?;
    if fit.is_degenerate() {
        return Ok(unreliable(anchor));
    }
    let basis = fit.components; // [D, d]

    // Orthogonal projection onto the tangent plane through the landmark.
    let projected = &centered * &basis * basis.transpose();
    let residual: f64 = (&centered - projected)
        .row_iter()
        .map(|row| row.norm())
        .sum();

    let frame = TangentFrame {
        base_point: anchor,
        basis,
    };
    Ok((LocalWeight::Residual(residual), TangentEstimate::Fitted(frame)))
}
