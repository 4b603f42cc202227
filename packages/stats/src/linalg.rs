//! Dense row-major matrices and Gauss-Jordan inversion.
//!
//! Sized for model fitting with a few dozen predictors; nothing here is
//! tuned for large systems.

use crate::StatsError;

/// Pivots of the equilibrated matrix (unit diagonal) smaller than this are
/// treated as zero.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// A dense row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a zero matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from equal-length rows.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::DimensionMismatch`] if the rows differ in
    /// length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, StatsError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(StatsError::DimensionMismatch {
                    message: format!("row {i} has {} columns, expected {cols}", row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Entry at `(r, c)`.
    #[must_use]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    /// Sets the entry at `(r, c)`.
    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        self.data[r * self.cols + c] = value;
    }

    /// One row as a slice.
    #[must_use]
    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Matrix-vector product `self · v`.
    #[must_use]
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        (0..self.rows)
            .map(|r| self.row(r).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// Weighted cross products `(Xᵀ W X, Xᵀ W z)` for diagonal weights `w`.
    #[must_use]
    pub fn weighted_normal_equations(&self, w: &[f64], z: &[f64]) -> (Self, Vec<f64>) {
        let p = self.cols;
        let mut xtwx = Self::zeros(p, p);
        let mut xtwz = vec![0.0; p];

        for r in 0..self.rows {
            let row = self.row(r);
            let wr = w[r];
            for i in 0..p {
                let wxi = wr * row[i];
                if wxi == 0.0 {
                    continue;
                }
                xtwz[i] += wxi * z[r];
                for j in i..p {
                    xtwx.data[i * p + j] += wxi * row[j];
                }
            }
        }

        // Mirror the upper triangle
        for i in 0..p {
            for j in 0..i {
                xtwx.data[i * p + j] = xtwx.data[j * p + i];
            }
        }

        (xtwx, xtwz)
    }

    /// Inverts a square matrix by Gauss-Jordan elimination with partial
    /// pivoting.
    ///
    /// The matrix is first equilibrated to `D^-½ A D^-½` with `D` its
    /// absolute diagonal, so a column with tiny weights (a rare, perfectly
    /// separated level) is judged against its own scale rather than against
    /// large uncentered columns. A zero diagonal entry is left unscaled.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::DimensionMismatch`] for a non-square matrix and
    /// [`StatsError::Singular`] when a pivot vanishes.
    pub fn inverse(&self) -> Result<Self, StatsError> {
        if self.rows != self.cols {
            return Err(StatsError::DimensionMismatch {
                message: format!("cannot invert a {}x{} matrix", self.rows, self.cols),
            });
        }

        let n = self.rows;
        let scale: Vec<f64> = (0..n)
            .map(|i| {
                let d = self.get(i, i).abs();
                if d > 0.0 && d.is_finite() {
                    d.sqrt()
                } else {
                    1.0
                }
            })
            .collect();

        let mut a = self.clone();
        for r in 0..n {
            for c in 0..n {
                a.set(r, c, a.get(r, c) / (scale[r] * scale[c]));
            }
        }
        let mut inv = Self::identity(n);

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&x, &y| a.get(x, col).abs().total_cmp(&a.get(y, col).abs()))
                .ok_or(StatsError::Singular)?;
            let pivot = a.get(pivot_row, col);
            if pivot.abs() <= SINGULAR_TOLERANCE || !pivot.is_finite() {
                return Err(StatsError::Singular);
            }

            a.swap_rows(col, pivot_row);
            inv.swap_rows(col, pivot_row);

            for c in 0..n {
                a.set(col, c, a.get(col, c) / pivot);
                inv.set(col, c, inv.get(col, c) / pivot);
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a.get(r, col);
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    a.set(r, c, a.get(r, c) - factor * a.get(col, c));
                    inv.set(r, c, inv.get(r, c) - factor * inv.get(col, c));
                }
            }
        }

        // Undo the equilibration: A⁻¹ = D^-½ B⁻¹ D^-½
        for r in 0..n {
            for c in 0..n {
                inv.set(r, c, inv.get(r, c) / (scale[r] * scale[c]));
            }
        }

        Ok(inv)
    }

    fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_two_by_two() {
        let m = Matrix::from_rows(&[vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
        let inv = m.inverse().unwrap();
        assert!((inv.get(0, 0) - 0.6).abs() < 1e-12);
        assert!((inv.get(0, 1) + 0.7).abs() < 1e-12);
        assert!((inv.get(1, 0) + 0.2).abs() < 1e-12);
        assert!((inv.get(1, 1) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn pivots_past_zero_diagonal() {
        let m = Matrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let inv = m.inverse().unwrap();
        assert!((inv.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((inv.get(1, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn detects_singular_matrix() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert!(matches!(m.inverse(), Err(StatsError::Singular)));
    }

    #[test]
    fn small_pivots_are_judged_against_their_own_column() {
        let m = Matrix::from_rows(&[
            vec![5_000.0, 2.0e-11, 0.0],
            vec![2.0e-11, 4.0e-10, 1.0e-10],
            vec![0.0, 1.0e-10, 1_600.0],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        // Product with the original is the identity
        for r in 0..3 {
            for c in 0..3 {
                let v: f64 = (0..3).map(|k| m.get(r, k) * inv.get(k, c)).sum();
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-9, "({r}, {c}) = {v}");
            }
        }
        assert!(inv.get(1, 1) > 1e9);
    }

    #[test]
    fn zero_column_is_singular() {
        let m = Matrix::from_rows(&[vec![3.0, 0.0], vec![0.0, 0.0]]).unwrap();
        assert!(matches!(m.inverse(), Err(StatsError::Singular)));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, StatsError::DimensionMismatch { .. }));
    }

    #[test]
    fn weighted_normal_equations_match_hand_computation() {
        let x = Matrix::from_rows(&[vec![1.0, 0.0], vec![1.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let (xtwx, xtwz) = x.weighted_normal_equations(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]);
        assert!((xtwx.get(0, 0) - 6.0).abs() < 1e-12);
        assert!((xtwx.get(0, 1) - 8.0).abs() < 1e-12);
        assert!((xtwx.get(1, 0) - 8.0).abs() < 1e-12);
        assert!((xtwx.get(1, 1) - 14.0).abs() < 1e-12);
        assert_eq!(xtwz.len(), 2);
        assert!((xtwz[1] - 8.0).abs() < 1e-12);
    }

    #[test]
    fn mul_vec() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.mul_vec(&[1.0, 1.0]), vec![3.0, 7.0]);
    }
}
