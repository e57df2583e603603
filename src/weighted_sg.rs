//! Savitzky-Golay smoothing with window weights for better stopband
//! suppression than traditional Savitzky-Golay (SG), following M. Schmid,
//! D. Rath and U. Diebold, 'Why and how Savitzky-Golay filters should be
//! replaced', ACS Measurement Science Au 2, 185 (2022). With
//! [`WeightType::None`] it performs traditional SG smoothing.
//!
//! Boundaries are handled without extrapolation: for each of the `m`
//! positions nearest an edge a dedicated asymmetric kernel is built by
//! weighted Gram-Schmidt orthonormalization of a polynomial basis over the
//! points that actually exist there.

use std::f64::consts::PI;

use nalgebra::DVector;

use crate::calibration::{check_bandwidth, savitzky_golay_bandwidth, sqr};
use crate::error::{Result, SmoothError};

/// Window weight functions for the weighted Savitzky-Golay filter, from no
/// weighting (traditional SG) to increasingly strong tapers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightType {
    /// Uniform weights; results in traditional SG smoothing
    None,
    /// Modified Gaussian with alpha = 2
    Gauss2,
    /// Hann window (raised cosine, cos^2)
    Hann,
    /// Hann-squared window (cos^4)
    HannSqr,
    /// Hann-cube window (cos^6)
    HannCube,
}

/// Coefficients a, b, c for the x-scale of near-edge kernels, one row per
/// weight type, for the equation scale = 1 - a/(1 + b*missing_frac^c)
const WEIGHT_SCALE_COEFFS: [[f64; 3]; 5] = [
    [1.0, 1.0, -1.0],               // None
    [0.68096, 0.36358, -3.68528],   // Gauss2
    [0.67574, 0.35440, -3.61580],   // Hann
    [0.63944, 0.28417, -5.508],     // HannSqr
    [0.62303, 0.25310, -7.07317],   // HannCube
];

impl WeightType {
    fn index(self) -> usize {
        match self {
            WeightType::None => 0,
            WeightType::Gauss2 => 1,
            WeightType::Hann => 2,
            WeightType::HannSqr => 3,
            WeightType::HannCube => 4,
        }
    }

    /// The weight function, where x = 0 is the window center and the weight
    /// becomes zero at x = 1
    fn evaluate(self, x: f64) -> f64 {
        if x <= -0.999999999999 || x >= 0.999999999999 {
            return 0.0;
        }
        match self {
            WeightType::None => 1.0,
            WeightType::Gauss2 => {
                let decay = 2.0;
                (-sqr(x) * decay).exp()
                    + (-sqr(x - 2.0) * decay).exp()
                    + (-sqr(x + 2.0) * decay).exp()
                    - 2.0 * (-decay).exp()
                    - (-9.0 * decay).exp()
            }
            WeightType::Hann => sqr((0.5 * PI * x).cos()),
            WeightType::HannSqr => sqr(sqr((0.5 * PI * x).cos())),
            WeightType::HannCube => {
                sqr(sqr((0.5 * PI * x).cos())) * sqr((0.5 * PI * x).cos())
            }
        }
    }

    /// Scale factor for x in the weight function at near-edge points;
    /// `missing_frac` is the fraction of the half-width m that falls outside
    /// the data range
    fn scale(self, missing_frac: f64) -> f64 {
        if missing_frac <= 0.0 {
            return 1.0;
        }
        let [a, b, c] = WEIGHT_SCALE_COEFFS[self.index()];
        1.0 - a / (1.0 + b * missing_frac.powf(c))
    }
}

/// A weighted Savitzky-Golay smoother holding one interior kernel and `m`
/// near-edge kernels, reusable across many data arrays.
///
/// # Example
///
/// ```rust
/// use specsmooth::{WeightedSavitzkyGolaySmoother, WeightType};
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
/// let smoother = WeightedSavitzkyGolaySmoother::new(WeightType::HannSqr, 2, 3).unwrap();
/// let smoothed = smoother.smooth(&data).unwrap();
/// assert_eq!(smoothed.len(), data.len());
/// ```
#[derive(Debug)]
pub struct WeightedSavitzkyGolaySmoother {
    /// Half-width of the interior kernel
    m: usize,
    /// kernels[p_left] applies where p_left points exist to the left;
    /// kernels[m] is the symmetric interior kernel. For the final points of
    /// the data the near-edge kernels are applied reversed.
    kernels: Vec<Vec<f64>>,
}

impl WeightedSavitzkyGolaySmoother {
    /// Creates a smoother with the given weight function, polynomial fit
    /// degree and kernel half-width `m`; requires `degree <= 2m`.
    pub fn new(weight_type: WeightType, degree: usize, m: usize) -> Result<Self> {
        if degree > 2 * m {
            return Err(SmoothError::HalfWidthTooSmall(m, (degree + 1) / 2));
        }
        let kernels = (0..=m)
            .map(|p_left| make_left_kernel(weight_type, degree, m, p_left))
            .collect();
        Ok(Self { m, kernels })
    }

    /// The kernel half-width m
    pub fn half_width(&self) -> usize {
        self.m
    }

    /// Smooths the data; requires at least `2m + 1` points.
    pub fn smooth(&self, data: &[f64]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; data.len()];
        self.smooth_into(data, &mut out)?;
        Ok(out)
    }

    /// Like [`smooth`](Self::smooth), but writes into a caller-supplied
    /// buffer, which must have the same length as `data`.
    pub fn smooth_into(&self, data: &[f64], out: &mut [f64]) -> Result<()> {
        let m = self.m;
        let n = data.len();
        if n < 2 * m + 1 {
            return Err(SmoothError::InsufficientData(n, 2 * m + 1));
        }
        if out.len() != n {
            return Err(SmoothError::DataLengthMismatch(out.len(), n));
        }
        for i in 0..n - m {
            // left near-boundary and interior points
            let kernel = &self.kernels[i.min(m)];
            let start = i.saturating_sub(m);
            let mut sum = 0.0;
            for (j, &k) in kernel.iter().enumerate() {
                sum += k * data[start + j];
            }
            out[i] = sum;
        }
        for i in n - m..n {
            // near-boundary points at the right, kernels applied reversed
            let kernel = &self.kernels[n - 1 - i];
            let mut sum = 0.0;
            for (j, &k) in kernel.iter().enumerate() {
                sum += k * data[n - 1 - j];
            }
            out[i] = sum;
        }
        Ok(())
    }

    /// Constructs a smoother and smooths the data once. When smoothing
    /// multiple data sets with the same parameters, using the constructor and
    /// then [`smooth`](Self::smooth) is more efficient.
    pub fn smooth_once(
        data: &[f64],
        weight_type: WeightType,
        degree: usize,
        m: usize,
    ) -> Result<Vec<f64>> {
        let smoother = Self::new(weight_type, degree, m)?;
        smoother.smooth(data)
    }

    /// Smooths the data in a way comparable to a traditional Savitzky-Golay
    /// filter with the given `degree` and half-width `m`, but with
    /// Hann-squared weights for substantially better noise rejection. The
    /// data must have at least as many elements as the resulting kernel;
    /// this is more than `2m + 1` but never more than `4m + 1`.
    pub fn smooth_like_savitzky_golay(data: &[f64], degree: usize, m: usize) -> Result<Vec<f64>> {
        let bandwidth = savitzky_golay_bandwidth(degree, m);
        let m_sgw = Self::bandwidth_to_halfwidth(degree, bandwidth)?;
        Self::smooth_once(data, WeightType::HannSqr, degree, m_sgw)
    }

    /// Calculates the kernel half-width m for a given -3 dB bandwidth (with
    /// respect to the sampling frequency; must be below 0.5), for a filter
    /// with Hann-squared weights.
    pub fn bandwidth_to_halfwidth(degree: usize, bandwidth: f64) -> Result<usize> {
        check_bandwidth(bandwidth)?;
        let degree = degree as f64;
        let m = (0.5090025 + degree * (0.1922392 - degree * 0.001484498)) / bandwidth - 1.0;
        Ok(m.round() as usize)
    }
}

/// Creates the kernel for a point with `p_left` data points to its left, or
/// the symmetric interior kernel if `p_left == m`. Element 0 applies to the
/// leftmost point of the window.
fn make_left_kernel(weight_type: WeightType, degree: usize, m: usize, p_left: usize) -> Vec<f64> {
    let scale = weight_type.scale((m - p_left) as f64 / m as f64);
    let mut p_right = ((m + 1) as f64 / scale).floor() as usize;
    if p_right + p_left > 2 * m {
        p_right = 2 * m - p_left;
    }
    let len = p_left + p_right + 1;

    let mut weights = DVector::<f64>::zeros(len);
    for i in 0..=p_right {
        // more points at the right side
        let weight = weight_type.evaluate(i as f64 * scale / (m + 1) as f64);
        weights[p_left + i] = weight;
        if i != 0 && i <= p_left {
            weights[p_left - i] = weight;
        }
    }

    // polynomial basis of order 0 to degree over window-relative positions
    let mut polynomials: Vec<DVector<f64>> = Vec::with_capacity(degree + 1);
    polynomials.push(DVector::from_element(len, 1.0));
    normalize(&mut polynomials[0], &weights);
    for o in 1..=degree {
        let previous = &polynomials[o - 1];
        let next = DVector::from_fn(len, |i, _| previous[i] * (i as f64 - p_left as f64));
        polynomials.push(next);
    }
    // modified Gram-Schmidt orthonormalization with the weights as metric
    for o in 1..=degree {
        for u in 0..o {
            let projection = weighted_dot(&polynomials[u], &polynomials[o], &weights);
            let scaled = &polynomials[u] * projection;
            polynomials[o] -= scaled;
        }
        normalize(&mut polynomials[o], &weights);
    }
    // sum up the contributions of each basis polynomial at the target point
    let mut kernel = vec![0.0; len];
    for polynomial in &polynomials {
        let at_target = polynomial[p_left];
        for (k, &p) in kernel.iter_mut().zip(polynomial.iter()) {
            *k += p * at_target;
        }
    }
    for (k, &w) in kernel.iter_mut().zip(weights.iter()) {
        *k *= w;
    }
    kernel
}

/// Dot product of two vectors under the weight metric
fn weighted_dot(a: &DVector<f64>, b: &DVector<f64>, weights: &DVector<f64>) -> f64 {
    a.component_mul(b).dot(weights)
}

/// Normalizes a vector to unit length under the weight metric
fn normalize(vector: &mut DVector<f64>, weights: &DVector<f64>) {
    let dot = weighted_dot(vector, vector, weights);
    *vector *= 1.0 / dot.sqrt();
}
