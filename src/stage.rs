//! Tangent stage: neighborhood graph → tangent bundle → bundle weights.
//!
//! Pipeline position: point cloud [N, D] → (graph [N, m], bundle [m], weights [m]).
//!
//! The stage is a thin orchestrator over the free functions in
//! [`crate::neighborhood`], [`crate::bundle`] and [`crate::weights`]; it owns
//! only configuration and logging.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::bundle::{TangentBundle, tangent_bundle_with};
use crate::data::PointCloud;
use crate::error::{Result, TangentError};
use crate::neighborhood::{NeighborhoodGraph, neighborhood_graph};
use crate::subspace::SubspaceMethod;
use crate::weights::{Reduce, WeightMethod, bundle_weights};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the tangent stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TangentConfig {
    /// Ball radius r. Points within 2r of a landmark join its neighborhood.
    pub radius: f64,

    /// Tangent dimension d (intrinsic dimension of the sampled manifold).
    pub tangent_dim: usize,

    /// Landmark point indices. `None` uses every point.
    pub landmarks: Option<Vec<usize>>,

    /// Route used by the local subspace fitter.
    pub subspace: SubspaceMethod,

    /// Per-neighborhood statistic.
    pub method: WeightMethod,

    /// Aggregator collapsing per-neighbor statistics into one weight.
    pub reduce: Reduce,
}

impl Default for TangentConfig {
    fn default() -> Self {
        Self {
            radius: 0.25,
            tangent_dim: 2,
            landmarks: None,
            subspace: SubspaceMethod::Covariance,
            method: WeightMethod::Cosine,
            reduce: Reduce::Mean,
        }
    }
}

impl TangentConfig {
    /// Curves in any ambient dimension: d = 1, residual weights.
    pub fn curve(radius: f64) -> Self {
        Self {
            radius,
            tangent_dim: 1,
            method: WeightMethod::Distance,
            reduce: Reduce::Max,
            ..Default::default()
        }
    }

    /// Surfaces: d = 2, orientation-agreement weights.
    pub fn surface(radius: f64) -> Self {
        Self {
            radius,
            tangent_dim: 2,
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_tangent_dim(mut self, d: usize) -> Self {
        self.tangent_dim = d;
        self
    }

    pub fn with_landmarks(mut self, landmarks: Vec<usize>) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    pub fn with_subspace(mut self, subspace: SubspaceMethod) -> Self {
        self.subspace = subspace;
        self
    }

    pub fn with_method(mut self, method: WeightMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_reduce(mut self, reduce: Reduce) -> Self {
        self.reduce = reduce;
        self
    }

    /// Rejects parameter combinations no input could satisfy.
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(TangentError::InvalidRadius(self.radius));
        }
        if self.tangent_dim == 0 {
            return Err(TangentError::ZeroDimension);
        }
        if self.method == WeightMethod::Angle {
            return Err(TangentError::UnsupportedMethod(self.method.to_string()));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output type
// ─────────────────────────────────────────────────────────────────────────────

/// Output of the tangent stage. All three parts are index-aligned on the
/// graph columns.
#[derive(Debug, Clone)]
pub struct TangentOutput {
    pub graph: NeighborhoodGraph,
    pub bundle: TangentBundle,
    pub weights: Vec<f64>,
}

impl TangentOutput {
    pub fn summary(&self) -> String {
        let finite: Vec<f64> = self.weights.iter().copied().filter(|w| w.is_finite()).collect();
        let (min, max) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &w| {
                (lo.min(w), hi.max(w))
            });
        format!(
            "TangentOutput: N={}, m={}, nnz={}, degenerate={}, weights∈[{:.4}, {:.4}]",
            self.graph.n_points(),
            self.graph.n_neighborhoods(),
            self.graph.nnz(),
            self.bundle.n_degenerate(),
            min,
            max,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage executor
// ─────────────────────────────────────────────────────────────────────────────

/// Tangent stage executor.
pub struct TangentStage {
    pub config: TangentConfig,
}

impl TangentStage {
    pub fn new(config: TangentConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(TangentConfig::default())
    }

    /// Execute the stage with member centroids as base points.
    pub fn execute(&self, points: &PointCloud) -> Result<TangentOutput> {
        self.execute_with_centers(points, None)
    }

    /// Execute the stage, anchoring frame j at `centers[j]` when given.
    pub fn execute_with_centers(
        &self,
        points: &PointCloud,
        centers: Option<&PointCloud>,
    ) -> Result<TangentOutput> {
        self.config.validate()?;
        let cfg = &self.config;

        info!("╔═══════════════════════════════════════════════════════╗");
        info!("║  TANGENT STAGE: GRAPH → BUNDLE → WEIGHTS              ║");
        info!("╚═══════════════════════════════════════════════════════╝");
        info!(
            "📐 {} points in ℝ^{}, d={}, r={:.4}",
            points.n_points(),
            points.dim(),
            cfg.tangent_dim,
            cfg.radius
        );
        info!(
            "  • subspace={:?}, method={}, reduce={}",
            cfg.subspace, cfg.method, cfg.reduce
        );

        debug!("Step 1/3: Neighborhood graph");
        let graph = neighborhood_graph(points, cfg.radius, cfg.landmarks.as_deref())?;

        debug!("Step 2/3: Tangent bundle");
        let bundle = tangent_bundle_with(&graph, points, cfg.tangent_dim, centers, cfg.subspace)?;

        debug!("Step 3/3: Bundle weights");
        let weights = bundle_weights(&graph, &bundle, cfg.method, &cfg.reduce)?;

        let output = TangentOutput {
            graph,
            bundle,
            weights,
        };
        info!("  ✓ {}", output.summary());
        info!("╔═══════════════════════════════════════════════════════╗");
        info!("║  TANGENT STAGE COMPLETE                               ║");
        info!("╚═══════════════════════════════════════════════════════╝");
        Ok(output)
    }
}
