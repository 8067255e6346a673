//! # tangent-bundle
//!
//! Local linear approximations of a manifold sampled by a point cloud.
//!
//! Stages, leaves first:
//!
//! 1. [`subspace`]: local subspace fitting (covariance PCA and its Gram/CMDS dual).
//! 2. [`neighborhood`]: `2r` point × landmark incidence graph.
//! 3. [`bundle`]: one tangent frame per neighborhood, canonical fallback on degeneracy.
//! 4. [`weights`]: one quality statistic per neighborhood.
//!
//! [`stage::TangentStage`] runs 2 → 3 → 4 from a [`stage::TangentConfig`];
//! [`tangent_graph`] is the one-pass variant scoring each landmark by its own
//! projection residual, and [`cover`] selects neighborhoods covering every point.
//!
//! ```ignore
//! use tangent_bundle::{PointCloud, TangentConfig, TangentStage};
//!
//! let points = PointCloud::from_rows(&rows)?;
//! let output = TangentStage::new(TangentConfig::surface(0.1)).execute(&points)?;
//! let frame = output.bundle.frame(0);
//! ```

pub mod bundle;
pub mod cover;
pub mod data;
pub mod distance;
pub mod error;
pub mod neighborhood;
pub mod predicates;
pub mod stage;
pub mod subspace;
pub mod tangent_graph;
pub mod weights;

pub use bundle::{TangentBundle, TangentEstimate, TangentFrame, tangent_bundle};
pub use data::PointCloud;
pub use error::{Result, TangentError};
pub use neighborhood::{NeighborhoodGraph, neighborhood_graph};
pub use stage::{TangentConfig, TangentOutput, TangentStage};
pub use subspace::{SubspaceFit, SubspaceMethod};
pub use tangent_graph::{LocalWeight, TangentNeighborGraph, tangent_neighbor_graph};
pub use weights::{Reduce, Reducer, WeightMethod, bundle_weights};

#[cfg(test)]
mod tests;
