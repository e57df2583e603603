//! Symmetric band-diagonal matrix algebra: compact storage, in-place
//! Cholesky factorization and banded forward/back substitution.
//!
//! For a symmetric matrix of bandwidth `b` only the lower side is stored,
//! as `b` diagonals: `bands[0][i]` holds `a[i, i]`, `bands[1][i]` holds
//! `a[i+1, i]`, and so on, with `bands[d].len() == n - d`. A lower
//! triangular band matrix (the Cholesky factor) is stored exactly the same
//! way, so the factorization can overwrite its input.

use crate::error::{Result, SmoothError};

/// A symmetric band-diagonal matrix, or its lower Cholesky factor after
/// [`cholesky_in_place`](SymmetricBandMatrix::cholesky_in_place).
#[derive(Debug, Clone)]
pub(crate) struct SymmetricBandMatrix {
    bands: Vec<Vec<f64>>,
}

impl SymmetricBandMatrix {
    /// Creates an n x n zero matrix with `bandwidth` stored diagonals
    pub fn zeros(bandwidth: usize, n: usize) -> Self {
        let bands = (0..bandwidth).map(|d| vec![0.0; n - d]).collect();
        Self { bands }
    }

    /// The matrix dimension n
    pub fn size(&self) -> usize {
        self.bands[0].len()
    }

    /// Mutable access to the diagonal at distance `d` below the main one
    pub fn band_mut(&mut self, d: usize) -> &mut [f64] {
        &mut self.bands[d]
    }

    /// Replaces the matrix A by I + lambda * A
    pub fn scale_add_identity(&mut self, lambda: f64) {
        for value in self.bands[0].iter_mut() {
            *value = 1.0 + *value * lambda;
        }
        for band in self.bands.iter_mut().skip(1) {
            for value in band.iter_mut() {
                *value *= lambda;
            }
        }
    }

    /// Cholesky decomposition, replacing the matrix by its lower triangular
    /// factor L with A = L L'. Only entries within the band are touched.
    /// Fails if the matrix is not positive definite; for the penalized
    /// matrices built by this crate that indicates a logic error, not a data
    /// condition.
    pub fn cholesky_in_place(&mut self) -> Result<()> {
        let n = self.size();
        let dmax = self.bands.len() - 1;
        for i in 0..n {
            for j in i.saturating_sub(dmax)..=i {
                let mut sum = 0.0;
                for k in i.saturating_sub(dmax)..j {
                    sum += self.bands[i - k][k] * self.bands[j - k][k];
                }
                if i == j {
                    let sqrt_arg = self.bands[0][i] - sum;
                    if sqrt_arg <= 0.0 {
                        return Err(SmoothError::NotPositiveDefinite);
                    }
                    self.bands[0][i] = sqrt_arg.sqrt();
                } else {
                    self.bands[i - j][j] = (self.bands[i - j][j] - sum) / self.bands[0][j];
                }
            }
        }
        Ok(())
    }

    /// Solves L y = rhs by forward substitution and then L' x = y by back
    /// substitution, writing x into `out`. With L from
    /// [`cholesky_in_place`](Self::cholesky_in_place) this solves A x = rhs.
    pub fn solve_into(&self, rhs: &[f64], out: &mut [f64]) {
        debug_assert_eq!(rhs.len(), self.size());
        debug_assert_eq!(out.len(), self.size());
        let n = self.size();
        let dmax = self.bands.len() - 1;
        for i in 0..n {
            let mut sum = 0.0;
            for j in i.saturating_sub(dmax)..i {
                sum += self.bands[i - j][j] * out[j];
            }
            out[i] = (rhs[i] - sum) / self.bands[0][i];
        }
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in i + 1..(i + dmax + 1).min(n) {
                sum += self.bands[j - i][i] * out[j];
            }
            out[i] = (out[i] - sum) / self.bands[0][i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Tridiagonal test matrix [[2,-1,0],[-1,3,-1],[0,-1,2]]
    fn tridiagonal_spd() -> SymmetricBandMatrix {
        let mut matrix = SymmetricBandMatrix::zeros(2, 3);
        matrix.band_mut(0).copy_from_slice(&[2.0, 3.0, 2.0]);
        matrix.band_mut(1).copy_from_slice(&[-1.0, -1.0]);
        matrix
    }

    #[test]
    fn test_cholesky_solve_known_system() {
        let mut matrix = tridiagonal_spd();
        matrix.cholesky_in_place().unwrap();
        let mut out = vec![0.0; 3];
        matrix.solve_into(&[1.0, 2.0, 3.0], &mut out);
        // solved by hand: x = [1.5, 2.0, 2.5]
        assert_abs_diff_eq!(out[0], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[2], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_reusable_after_factorization() {
        let mut matrix = tridiagonal_spd();
        matrix.cholesky_in_place().unwrap();
        let mut first = vec![0.0; 3];
        matrix.solve_into(&[1.0, 1.0, 1.0], &mut first);
        let mut second = vec![0.0; 3];
        matrix.solve_into(&[1.0, 2.0, 3.0], &mut second);
        let mut repeat = vec![0.0; 3];
        matrix.solve_into(&[1.0, 1.0, 1.0], &mut repeat);
        assert_eq!(first, repeat);
        // rows of A times x reproduce the right-hand side
        assert_abs_diff_eq!(2.0 * first[0] - first[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(-first[0] + 3.0 * first[1] - first[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_add_identity() {
        let mut matrix = SymmetricBandMatrix::zeros(2, 3);
        matrix.band_mut(0).copy_from_slice(&[1.0, 2.0, 1.0]);
        matrix.band_mut(1).copy_from_slice(&[-1.0, -1.0]);
        matrix.scale_add_identity(10.0);
        assert_eq!(matrix.bands[0], vec![11.0, 21.0, 11.0]);
        assert_eq!(matrix.bands[1], vec![-10.0, -10.0]);
    }

    #[test]
    fn test_not_positive_definite_detected() {
        let mut matrix = SymmetricBandMatrix::zeros(2, 3);
        matrix.band_mut(0).copy_from_slice(&[-1.0, 1.0, 1.0]);
        assert_eq!(
            matrix.cholesky_in_place().unwrap_err(),
            SmoothError::NotPositiveDefinite
        );
    }

    #[test]
    fn test_cholesky_factor_values() {
        // For [[4,2],[2,5]] the factor is [[2,0],[1,2]]
        let mut matrix = SymmetricBandMatrix::zeros(2, 2);
        matrix.band_mut(0).copy_from_slice(&[4.0, 5.0]);
        matrix.band_mut(1).copy_from_slice(&[2.0]);
        matrix.cholesky_in_place().unwrap();
        assert_abs_diff_eq!(matrix.bands[0][0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix.bands[1][0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix.bands[0][1], 2.0, epsilon = 1e-12);
    }
}
