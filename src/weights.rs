//! Bundle weights: one scalar quality statistic per neighborhood.
//!
//! Neighbors of neighborhood j are the neighborhoods whose landmark point is a
//! member of column j (see [`NeighborhoodGraph::neighbor_neighborhoods`]).
//! When every point is a landmark this is exactly "the rows of column j".
//!
//! | Method     | Per-neighbor statistic                                    | Large value means                  |
//! | :--        | :--                                                       | :--                                |
//! | `distance` | residual of neighbor base point to each tangent line of j | poor local linear fit              |
//! | `cosine`   | sign-invariant cosine distance between flattened bases    | neighboring planes disagree        |
//! | `angle`    | not supported                                             | n/a                                |

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bundle::TangentBundle;
use crate::distance::unsigned_cosine_distance;
use crate::error::{Result, TangentError};
use crate::neighborhood::NeighborhoodGraph;

/// Statistic computed per neighborhood.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMethod {
    /// Projection residuals onto each tangent direction.
    Distance,
    /// Basis alignment with neighboring frames.
    #[default]
    Cosine,
    /// Principal angles between subspaces. Declared, not implemented.
    Angle,
}

impl fmt::Display for WeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WeightMethod::Distance => write!(f, "distance"),
            WeightMethod::Cosine => write!(f, "cosine"),
            WeightMethod::Angle => write!(f, "angle"),
        }
    }
}

impl FromStr for WeightMethod {
    type Err = TangentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "distance" => Ok(WeightMethod::Distance),
            "cosine" => Ok(WeightMethod::Cosine),
            "angle" => Ok(WeightMethod::Angle),
            other => Err(TangentError::UnknownMethod(other.to_string())),
        }
    }
}

/// Collapses a set of local statistics into one weight.
pub trait Reducer: Sync {
    fn reduce(&self, values: &[f64]) -> f64;
}

impl<F> Reducer for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn reduce(&self, values: &[f64]) -> f64 {
        self(values)
    }
}

/// Named reducers. All of them return `NaN` on an empty input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduce {
    #[default]
    Mean,
    Max,
    Min,
    Sum,
    Median,
}

impl Reducer for Reduce {
    fn reduce(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        match self {
            Reduce::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Reduce::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reduce::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reduce::Sum => values.iter().sum(),
            Reduce::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    0.5 * (sorted[mid - 1] + sorted[mid])
                } else {
                    sorted[mid]
                }
            }
        }
    }
}

impl fmt::Display for Reduce {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Reduce::Mean => "mean",
            Reduce::Max => "max",
            Reduce::Min => "min",
            Reduce::Sum => "sum",
            Reduce::Median => "median",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Reduce {
    type Err = TangentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Reduce::Mean),
            "max" => Ok(Reduce::Max),
            "min" => Ok(Reduce::Min),
            "sum" => Ok(Reduce::Sum),
            "median" => Ok(Reduce::Median),
            other => Err(TangentError::UnknownReduction(other.to_string())),
        }
    }
}

/// Computes one weight per neighborhood of `graph` from the aligned `bundle`.
///
/// Every neighborhood is evaluated; the output has length
/// `graph.n_neighborhoods()`.
///
/// A neighborhood with no neighboring frames (its column holds no landmark
/// point) hands the reducer an empty slice. Every [`Reduce`] variant maps that
/// to `NaN`, so `NaN` in the output means "no neighbors to compare against",
/// never a numerical failure.
pub fn bundle_weights<R: Reducer + ?Sized>(
    graph: &NeighborhoodGraph,
    bundle: &TangentBundle,
    method: WeightMethod,
    reducer: &R,
) -> Result<Vec<f64>> {
    let m = graph.n_neighborhoods();
    if bundle.len() != m {
        return Err(TangentError::ShapeMismatch {
            what: "bundle length vs neighborhoods",
            expected: m,
            got: bundle.len(),
        });
    }

    let weights: Vec<f64> = match method {
        WeightMethod::Angle => {
            return Err(TangentError::UnsupportedMethod(method.to_string()));
        }
        WeightMethod::Distance => {
            info!("Computing distance weights over {} neighborhoods", m);
            (0..m)
                .into_par_iter()
                .map(|j| reducer.reduce(&projection_residuals(graph, bundle, j)))
                .collect()
        }
        WeightMethod::Cosine => {
            info!("Computing cosine weights over {} neighborhoods", m);
            // Column-major storage already lays each basis out as its
            // columns concatenated.
            let flat: Vec<&[f64]> = bundle.frames().map(|f| f.basis.as_slice()).collect();
            (0..m)
                .into_par_iter()
                .map(|j| {
                    let dists: Vec<f64> = graph
                        .neighbor_neighborhoods(j)
                        .into_iter()
                        .map(|k| unsigned_cosine_distance(flat[j], flat[k]))
                        .collect();
                    reducer.reduce(&dists)
                })
                .collect()
        }
    };

    let isolated = (0..m)
        .filter(|&j| graph.neighbor_neighborhoods(j).is_empty())
        .count();
    if isolated > 0 {
        warn!(
            "{} of {} neighborhoods have no neighboring frames; reducer saw an empty slice",
            isolated, m
        );
    }
    debug!(
        "Bundle weights: {} finite of {}",
        weights.iter().filter(|w| w.is_finite()).count(),
        weights.len()
    );
    Ok(weights)
}

/// Residuals [neighbors × d], row-major, of every neighbor base point against
/// each tangent line of frame j.
fn projection_residuals(graph: &NeighborhoodGraph, bundle: &TangentBundle, j: usize) -> Vec<f64> {
    let frame = bundle.frame(j);
    let neighbors = graph.neighbor_neighborhoods(j);
    let mut out = Vec::with_capacity(neighbors.len() * frame.tangent_dim());
    for k in neighbors {
        let q = &bundle.frame(k).base_point;
        let offset = q - &frame.base_point;
        for v in frame.basis.column_iter() {
            let t = offset.dot(&v);
            // |p + v t − q| = |v t − offset|
            out.push((v * t - &offset).norm());
        }
    }
    out
}
