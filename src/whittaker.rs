//! Whittaker-Henderson smoothing for data at equally spaced points,
//! popularized by P. H. C. Eilers in "A Perfect Smoother", Anal. Chem. 75,
//! 3631 (2003).
//!
//! The smoother minimizes `sum((f - y)^2) + lambda * sum((f^(p))^2)`, where
//! `y` are the data, `f` the smoothed values, and `f^(p)` the p-th derivative
//! of `f` evaluated numerically, i.e. it penalizes the p-th derivative as a
//! measure of non-smoothness. Smoothing increases with lambda. The normal
//! equations `(I + lambda * D'D) f = y` form a symmetric band matrix of
//! bandwidth `p + 1`, which is Cholesky-factorized once and then solved per
//! data vector, so cost and memory stay linear in the data length.
//!
//! For points far from the boundaries the frequency response is
//! `1/(1 + lambda*(2 - 2 cos(omega))^p)` with `omega = 2 pi f / fs`.
//! Note that strong smoothing leads to numerical noise: for `lambda = 1e9`
//! it is about 1e-6 times the magnitude of the data. Higher orders need
//! larger lambda for the same bandwidth, so orders above 2 or 3 are rarely
//! advisable.

use crate::band_matrix::SymmetricBandMatrix;
use crate::calibration::{check_bandwidth, savitzky_golay_bandwidth};
use crate::error::{Result, SmoothError};
use crate::modified_sinc::MAX_DEGREE;

/// This implementation is for a penalty derivative order up to 5
pub const MAX_ORDER: usize = 5;

/// Coefficients for numerical differentiation, orders 1 to `MAX_ORDER`
const DIFF_COEFF: [&[f64]; MAX_ORDER] = [
    &[-1.0, 1.0],
    &[1.0, -2.0, 1.0],
    &[-1.0, 3.0, -3.0, 1.0],
    &[1.0, -4.0, 6.0, -4.0, 1.0],
    &[-1.0, 5.0, -10.0, 10.0, -5.0, 1.0],
];

/// Coefficients for converting noise gain to lambda, defined for penalty
/// orders 1 to 4
const LAMBDA_FOR_NOISE_GAIN: [f64; 5] = [0.06284, 0.005010, 0.0004660, 4.520e-05, 4.467e-06];

/// A Whittaker-Henderson smoother holding the Cholesky-factorized penalized
/// matrix for one (length, order, lambda) combination. The factorization is
/// reused across [`smooth`](Self::smooth) calls, so one instance can cheaply
/// smooth many data vectors of the same length.
///
/// # Example
///
/// ```rust
/// use specsmooth::WhittakerHendersonSmoother;
///
/// let data: Vec<f64> = (0..32).map(|i| (i as f64 * 0.2).sin()).collect();
/// let smoother = WhittakerHendersonSmoother::new(data.len(), 2, 100.0).unwrap();
/// let smoothed = smoother.smooth(&data).unwrap();
/// assert_eq!(smoothed.len(), data.len());
/// ```
#[derive(Debug)]
pub struct WhittakerHendersonSmoother {
    /// Lower Cholesky factor of I + lambda * D'D
    matrix: SymmetricBandMatrix,
}

impl WhittakerHendersonSmoother {
    /// Creates a smoother for data of the given length, penalizing the
    /// derivative of the given order (typically 2 or 3) with strength
    /// `lambda` (see [`bandwidth_to_lambda`](Self::bandwidth_to_lambda)).
    pub fn new(length: usize, order: usize, lambda: f64) -> Result<Self> {
        let mut matrix = make_penalty_matrix(order, length)?;
        matrix.scale_add_identity(lambda);
        matrix.cholesky_in_place()?;
        Ok(Self { matrix })
    }

    /// The data length this smoother was built for
    pub fn length(&self) -> usize {
        self.matrix.size()
    }

    /// Smooths the data, which must have the length passed at construction.
    pub fn smooth(&self, data: &[f64]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; data.len()];
        self.smooth_into(data, &mut out)?;
        Ok(out)
    }

    /// Like [`smooth`](Self::smooth), but writes into a caller-supplied
    /// buffer of the same length.
    pub fn smooth_into(&self, data: &[f64], out: &mut [f64]) -> Result<()> {
        if data.len() != self.length() {
            return Err(SmoothError::DataLengthMismatch(data.len(), self.length()));
        }
        if out.len() != data.len() {
            return Err(SmoothError::DataLengthMismatch(out.len(), data.len()));
        }
        self.matrix.solve_into(data, out);
        Ok(())
    }

    /// Constructs a smoother and smooths the data once. When smoothing
    /// multiple data sets of the same length, using the constructor and then
    /// [`smooth`](Self::smooth) is more efficient.
    pub fn smooth_once(data: &[f64], order: usize, lambda: f64) -> Result<Vec<f64>> {
        let smoother = Self::new(data.len(), order, lambda)?;
        smoother.smooth(data)
    }

    /// Smooths the data in a way comparable to a traditional Savitzky-Golay
    /// filter with the given `degree` (2, 4, ... 10) and half-width `m`.
    ///
    /// Very strong smoothing leads to numerical noise; recommended limits
    /// for `m` are 700, 190, 100, and 75 for degrees 2, 4, 6, and 8.
    pub fn smooth_like_savitzky_golay(data: &[f64], degree: usize, m: usize) -> Result<Vec<f64>> {
        if degree < 2 || degree > MAX_DEGREE || degree % 2 != 0 {
            return Err(SmoothError::InvalidDegree(degree));
        }
        let order = degree / 2 + 1;
        let bandwidth = savitzky_golay_bandwidth(degree, m);
        let lambda = Self::bandwidth_to_lambda(order, bandwidth)?;
        Self::smooth_once(data, order, lambda)
    }

    /// Calculates the lambda parameter that places the -3 dB point of the
    /// response at the given bandwidth (with respect to the sampling
    /// frequency; must be below 0.5). Valid far from the boundaries.
    ///
    /// Very high lambda values lead to noticeable numerical noise; values
    /// below 1e9 keep the relative noise below about 1e-6. For a given
    /// bandwidth, lambda can be reduced by choosing a lower order.
    pub fn bandwidth_to_lambda(order: usize, bandwidth: f64) -> Result<f64> {
        if order < 1 || order > MAX_ORDER {
            return Err(SmoothError::InvalidPenaltyOrder(order));
        }
        check_bandwidth(bandwidth)?;
        let omega = 2.0 * std::f64::consts::PI * bandwidth;
        let cos_term = 2.0 * (1.0 - omega.cos());
        let mut cos_power = cos_term;
        for _ in 1..order {
            cos_power *= cos_term; // finally (2 - 2 cos(omega))^order
        }
        Ok((std::f64::consts::SQRT_2 - 1.0) / cos_power)
    }

    /// Calculates an approximation of lambda for a given white-noise gain,
    /// for points far from the boundaries (the noise gain is much higher
    /// near them). Good accuracy for noise gains below 0.1; around 0.4 the
    /// actual gain is about 10% higher. Defined for penalty orders 1 to 4.
    pub fn noise_gain_to_lambda(order: usize, noise_gain: f64) -> Result<f64> {
        if order < 1 || order >= LAMBDA_FOR_NOISE_GAIN.len() {
            return Err(SmoothError::InvalidPenaltyOrder(order));
        }
        let mut g_power = noise_gain;
        for _ in 1..order {
            g_power *= noise_gain; // finally noise_gain^order
        }
        Ok(LAMBDA_FOR_NOISE_GAIN[order] / (g_power + g_power))
    }
}

/// Creates the symmetric band-diagonal matrix D'D, where D is the
/// finite-difference operator of the given order. The band entries are the
/// sliding-window correlation of the difference coefficients, so the full
/// matrix is never materialized.
fn make_penalty_matrix(order: usize, size: usize) -> Result<SymmetricBandMatrix> {
    if order < 1 || order > MAX_ORDER {
        return Err(SmoothError::InvalidPenaltyOrder(order));
    }
    if size < order {
        return Err(SmoothError::InsufficientData(size, order));
    }
    let coeffs = DIFF_COEFF[order - 1];
    let mut matrix = SymmetricBandMatrix::zeros(order + 1, size);
    for d in 0..=order {
        let band = matrix.band_mut(d);
        let len = band.len();
        for i in 0..(len + 1) / 2 {
            let j_start = (i + coeffs.len()).saturating_sub(len + d);
            let j_end = (i + 1).min(coeffs.len() - d);
            let mut sum = 0.0;
            for j in j_start..j_end {
                sum += coeffs[j] * coeffs[j + d];
            }
            band[i] = sum;
            band[len - 1 - i] = sum; // the band is symmetric about its middle
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn band(matrix: &mut SymmetricBandMatrix, d: usize) -> Vec<f64> {
        matrix.band_mut(d).to_vec()
    }

    #[test]
    fn test_penalty_matrix_first_order() {
        // D'D for D = first differences of 4 points
        let mut matrix = make_penalty_matrix(1, 4).unwrap();
        assert_eq!(band(&mut matrix, 0), vec![1.0, 2.0, 2.0, 1.0]);
        assert_eq!(band(&mut matrix, 1), vec![-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_penalty_matrix_second_order() {
        let mut matrix = make_penalty_matrix(2, 5).unwrap();
        assert_eq!(band(&mut matrix, 0), vec![1.0, 5.0, 6.0, 5.0, 1.0]);
        assert_eq!(band(&mut matrix, 1), vec![-2.0, -4.0, -4.0, -2.0]);
        assert_eq!(band(&mut matrix, 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_invalid_order_rejected() {
        assert_eq!(
            make_penalty_matrix(0, 10).unwrap_err(),
            SmoothError::InvalidPenaltyOrder(0)
        );
        assert_eq!(
            make_penalty_matrix(6, 10).unwrap_err(),
            SmoothError::InvalidPenaltyOrder(6)
        );
        assert_eq!(
            make_penalty_matrix(3, 2).unwrap_err(),
            SmoothError::InsufficientData(2, 3)
        );
    }

    #[test]
    fn test_constant_preserved_exactly() {
        // D'D annihilates constants, so (I + lambda D'D) c = c
        for order in 1..=MAX_ORDER {
            let smoother = WhittakerHendersonSmoother::new(40, order, 1000.0).unwrap();
            let data = vec![3.25; 40];
            let out = smoother.smooth(&data).unwrap();
            for &value in &out {
                assert_abs_diff_eq!(value, 3.25, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_factorization_reused_across_solves() {
        let smoother = WhittakerHendersonSmoother::new(25, 2, 50.0).unwrap();
        let first: Vec<f64> = (0..25).map(|i| (i as f64 * 0.4).sin()).collect();
        let second: Vec<f64> = (0..25).map(|i| (i as f64 * 0.4).cos()).collect();
        let out_first = smoother.smooth(&first).unwrap();
        let out_second = smoother.smooth(&second).unwrap();
        let out_first_again = smoother.smooth(&first).unwrap();
        assert_eq!(out_first, out_first_again);
        assert_ne!(out_first, out_second);
    }

    #[test]
    fn test_smoothing_reduces_roughness() {
        let data: Vec<f64> = (0..60)
            .map(|i| (i as f64 * 0.15).sin() + 0.3 * (i as f64 * 2.3).sin())
            .collect();
        let out = WhittakerHendersonSmoother::smooth_once(&data, 2, 100.0).unwrap();
        let roughness = |v: &[f64]| -> f64 {
            v.windows(3)
                .map(|w| (w[0] - 2.0 * w[1] + w[2]).powi(2))
                .sum()
        };
        assert!(roughness(&out) < roughness(&data));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let smoother = WhittakerHendersonSmoother::new(10, 2, 1.0).unwrap();
        let data = vec![0.0; 12];
        assert_eq!(
            smoother.smooth(&data).unwrap_err(),
            SmoothError::DataLengthMismatch(12, 10)
        );
    }

    #[test]
    fn test_bandwidth_to_lambda_quarter_band() {
        // at bandwidth 0.25, cos(omega) = 0, so the denominator is 2^order
        let lambda = WhittakerHendersonSmoother::bandwidth_to_lambda(2, 0.25).unwrap();
        assert_abs_diff_eq!(lambda, (std::f64::consts::SQRT_2 - 1.0) / 4.0, epsilon = 1e-12);
        assert!(WhittakerHendersonSmoother::bandwidth_to_lambda(2, 0.6).is_err());
        assert!(WhittakerHendersonSmoother::bandwidth_to_lambda(0, 0.2).is_err());
    }

    #[test]
    fn test_noise_gain_to_lambda() {
        let lambda = WhittakerHendersonSmoother::noise_gain_to_lambda(2, 0.1).unwrap();
        assert_abs_diff_eq!(lambda, 0.0004660 / 0.02, epsilon = 1e-12);
        // the conversion table covers orders 1 to 4 only
        assert_eq!(
            WhittakerHendersonSmoother::noise_gain_to_lambda(5, 0.1).unwrap_err(),
            SmoothError::InvalidPenaltyOrder(5)
        );
    }

    #[test]
    fn test_smooth_like_sg_rejects_invalid_degrees() {
        let data = vec![1.0; 50];
        assert_eq!(
            WhittakerHendersonSmoother::smooth_like_savitzky_golay(&data, 5, 7).unwrap_err(),
            SmoothError::InvalidDegree(5)
        );
        assert_eq!(
            WhittakerHendersonSmoother::smooth_like_savitzky_golay(&data, 12, 7).unwrap_err(),
            SmoothError::InvalidDegree(12)
        );
        assert!(WhittakerHendersonSmoother::smooth_like_savitzky_golay(&data, 4, 7).is_ok());
    }

    #[test]
    fn test_interior_frequency_response() {
        // a pure sine far below the cutoff passes nearly unchanged in the
        // interior
        let n = 200;
        let data: Vec<f64> = (0..n).map(|i| (i as f64 * 0.05).sin()).collect();
        let lambda = WhittakerHendersonSmoother::bandwidth_to_lambda(2, 0.1).unwrap();
        let out = WhittakerHendersonSmoother::smooth_once(&data, 2, lambda).unwrap();
        for i in 40..n - 40 {
            assert_abs_diff_eq!(out[i], data[i], epsilon = 0.01);
        }
    }
}
