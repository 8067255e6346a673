//! Neighborhood graph: bipartite incidence between points and landmarks.
//!
//! Pipeline position: point cloud [N, D] → incidence M [N, m] (CSC, boolean).
//! Column j holds every point within `2r` of landmark j (inclusive), so two
//! landmarks share members whenever their r-balls overlap.
//!
//! Empty columns are legal here; downstream stages handle them as degenerate
//! neighborhoods.

use log::{debug, info};
use rayon::prelude::*;
use sprs::CsMat;

use crate::data::PointCloud;
use crate::distance::row_distance;
use crate::error::{Result, TangentError};

/// Point × neighborhood incidence with the landmark behind every column.
#[derive(Debug, Clone)]
pub struct NeighborhoodGraph {
    /// Boolean incidence [N, m], column-major.
    adjacency: CsMat<bool>,
    /// Point index of the landmark owning each column. Length m.
    landmarks: Vec<usize>,
    /// Radius the graph was built with; `None` for externally supplied graphs.
    radius: Option<f64>,
    /// point index → first column whose landmark is that point.
    landmark_column: Vec<Option<usize>>,
}

impl NeighborhoodGraph {
    /// Builds a graph from explicit member lists, one per landmark.
    ///
    /// Member lists are sorted and deduplicated; every index must be `< n_points`.
    pub fn from_columns(
        n_points: usize,
        landmarks: Vec<usize>,
        columns: Vec<Vec<usize>>,
    ) -> Result<Self> {
        if landmarks.len() != columns.len() {
            return Err(TangentError::ShapeMismatch {
                what: "member lists per landmark",
                expected: landmarks.len(),
                got: columns.len(),
            });
        }
        if let Some(&index) = landmarks.iter().find(|&&l| l >= n_points) {
            return Err(TangentError::IndexOutOfBounds {
                what: "points (landmark)",
                index,
                len: n_points,
            });
        }

        let mut sorted = Vec::with_capacity(columns.len());
        for mut col in columns {
            col.sort_unstable();
            col.dedup();
            if let Some(&index) = col.last().filter(|&&i| i >= n_points) {
                return Err(TangentError::IndexOutOfBounds {
                    what: "points (member)",
                    index,
                    len: n_points,
                });
            }
            sorted.push(col);
        }

        Ok(Self::assemble(n_points, landmarks, sorted, None))
    }

    /// Packs sorted, in-range member lists into CSC storage.
    fn assemble(
        n_points: usize,
        landmarks: Vec<usize>,
        columns: Vec<Vec<usize>>,
        radius: Option<f64>,
    ) -> Self {
        let m = columns.len();
        let nnz: usize = columns.iter().map(|c| c.len()).sum();

        let mut indptr = Vec::with_capacity(m + 1);
        let mut indices = Vec::with_capacity(nnz);
        indptr.push(0);
        for col in columns {
            indices.extend(col);
            indptr.push(indices.len());
        }
        let data = vec![true; nnz];
        let adjacency = CsMat::new_csc((n_points, m), indptr, indices, data);

        let mut landmark_column = vec![None; n_points];
        for (j, &l) in landmarks.iter().enumerate() {
            landmark_column[l].get_or_insert(j);
        }

        Self {
            adjacency,
            landmarks,
            radius,
            landmark_column,
        }
    }

    pub fn adjacency(&self) -> &CsMat<bool> {
        &self.adjacency
    }

    pub fn landmarks(&self) -> &[usize] {
        &self.landmarks
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    pub fn n_points(&self) -> usize {
        self.adjacency.rows()
    }

    pub fn n_neighborhoods(&self) -> usize {
        self.adjacency.cols()
    }

    pub fn nnz(&self) -> usize {
        self.adjacency.nnz()
    }

    /// Sorted point indices of neighborhood `j`.
    pub fn members(&self, j: usize) -> &[usize] {
        let range = self.adjacency.indptr().outer_inds_sz(j);
        &self.adjacency.indices()[range]
    }

    pub fn contains(&self, point: usize, j: usize) -> bool {
        self.members(j).binary_search(&point).is_ok()
    }

    /// Column owned by landmark point `point`, if that point is a landmark.
    pub fn column_of(&self, point: usize) -> Option<usize> {
        self.landmark_column.get(point).copied().flatten()
    }

    /// Neighborhoods adjacent to `j`: those whose landmark point is a member
    /// of column j. Includes `j` itself whenever its landmark is a member.
    pub fn neighbor_neighborhoods(&self, j: usize) -> Vec<usize> {
        self.members(j)
            .iter()
            .filter_map(|&i| self.column_of(i))
            .collect()
    }

    /// All `(point, neighborhood)` incidences, column by column.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.n_neighborhoods()).flat_map(move |j| self.members(j).iter().map(move |&i| (i, j)))
    }

    /// Member count per neighborhood.
    pub fn sizes(&self) -> Vec<usize> {
        (0..self.n_neighborhoods()).map(|j| self.members(j).len()).collect()
    }

    pub fn summary(&self) -> String {
        let sizes = self.sizes();
        let empty = sizes.iter().filter(|&&s| s == 0).count();
        let mean = if sizes.is_empty() {
            0.0
        } else {
            sizes.iter().sum::<usize>() as f64 / sizes.len() as f64
        };
        format!(
            "NeighborhoodGraph: N={}, m={}, nnz={}, mean_size={:.2}, empty={}",
            self.n_points(),
            self.n_neighborhoods(),
            self.nnz(),
            mean,
            empty,
        )
    }
}

/// Builds the `2r` neighborhood graph of `points` at `landmarks`
/// (all points when `None`).
pub fn neighborhood_graph(
    points: &PointCloud,
    radius: f64,
    landmarks: Option<&[usize]>,
) -> Result<NeighborhoodGraph> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(TangentError::InvalidRadius(radius));
    }
    let n = points.n_points();
    let landmarks: Vec<usize> = match landmarks {
        Some(ind) => {
            if let Some(&index) = ind.iter().find(|&&l| l >= n) {
                return Err(TangentError::IndexOutOfBounds {
                    what: "points (landmark)",
                    index,
                    len: n,
                });
            }
            ind.to_vec()
        }
        None => (0..n).collect(),
    };

    info!(
        "Building neighborhood graph: N={}, m={}, r={:.4} (threshold 2r={:.4})",
        n,
        landmarks.len(),
        radius,
        2.0 * radius
    );

    let threshold = 2.0 * radius;
    let coords = points.coords();
    let columns: Vec<Vec<usize>> = landmarks
        .par_iter()
        .map(|&l| {
            (0..n)
                .filter(|&i| row_distance(coords, i, coords, l) <= threshold)
                .collect()
        })
        .collect();

    let graph = NeighborhoodGraph::assemble(n, landmarks, columns, Some(radius));
    debug!("{}", graph.summary());
    Ok(graph)
}
