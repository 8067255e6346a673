//! Point cloud container.
//!
//! Points are stored as the rows of a dense `nalgebra::DMatrix<f64>` [N, D].
//! The container is immutable once built; every stage borrows it.

use nalgebra::{DMatrix, DVector, RowDVector};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{Result, TangentError};

#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    coords: DMatrix<f64>, // [N, D]
}

impl PointCloud {
    /// Build from a dense [N, D] matrix, one point per row.
    pub fn new(coords: DMatrix<f64>) -> Result<Self> {
        if coords.ncols() == 0 {
            return Err(TangentError::EmptyDimension);
        }
        Ok(Self { coords })
    }

    /// Build from row vectors. All rows must share the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        if dim == 0 {
            return Err(TangentError::EmptyDimension);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(TangentError::RaggedRows {
                row,
                expected: dim,
                got: r.len(),
            });
        }
        let coords = DMatrix::from_fn(rows.len(), dim, |i, j| rows[i][j]);
        Ok(Self { coords })
    }

    /// Build from a flat row-major buffer [N*D].
    pub fn from_flat(data: &[f64], n: usize, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(TangentError::EmptyDimension);
        }
        if data.len() != n * dim {
            return Err(TangentError::ShapeMismatch {
                what: "flat point buffer",
                expected: n * dim,
                got: data.len(),
            });
        }
        Ok(Self {
            coords: DMatrix::from_row_slice(n, dim, data),
        })
    }

    /// Build from a smartcore design matrix, rows as points.
    pub fn from_dense(matrix: &DenseMatrix<f64>) -> Result<Self> {
        let (n, dim) = matrix.shape();
        if dim == 0 {
            return Err(TangentError::EmptyDimension);
        }
        let coords = DMatrix::from_fn(n, dim, |i, j| *matrix.get((i, j)));
        Ok(Self { coords })
    }

    pub fn n_points(&self) -> usize {
        self.coords.nrows()
    }

    pub fn dim(&self) -> usize {
        self.coords.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    pub fn coords(&self) -> &DMatrix<f64> {
        &self.coords
    }

    /// Point `i` as an owned column vector.
    pub fn point(&self, i: usize) -> DVector<f64> {
        self.coords.row(i).transpose()
    }

    /// Rows at `indices`, in the given order, as a new [k, D] matrix.
    pub fn select(&self, indices: &[usize]) -> DMatrix<f64> {
        self.coords.select_rows(indices.iter())
    }

    /// Arithmetic mean of the rows at `indices`. `None` when `indices` is empty.
    pub fn mean_of(&self, indices: &[usize]) -> Option<DVector<f64>> {
        if indices.is_empty() {
            return None;
        }
        let mut acc = RowDVector::<f64>::zeros(self.dim());
        for &i in indices {
            acc += self.coords.row(i);
        }
        Some((acc / indices.len() as f64).transpose())
    }
}
