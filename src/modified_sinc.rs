//! Smoothing by a modified sinc kernel (MS or MS1), as described in
//! M. Schmid, D. Rath and U. Diebold, 'Why and how Savitzky-Golay filters
//! should be replaced', ACS Measurement Science Au 2, 185 (2022).
//!
//! The term 'degree' is defined in analogy to Savitzky-Golay (SG) filters;
//! the MS filters have a similar frequency response as SG filters of the
//! same degree (2, 4, ... 10) but with much better stopband suppression.
//! Near-boundary points are handled by weighted linear extrapolation of the
//! data before convolution, so the kernel itself never special-cases edges.

use std::f64::consts::PI;

use crate::calibration::{check_bandwidth, savitzky_golay_bandwidth, sqr};
use crate::error::{Result, SmoothError};
use crate::regression::LinearRegression;

/// This implementation is for a maximum degree of 10
pub const MAX_DEGREE: usize = 10;

/// Selects between the standard MS kernel and the shorter MS1 variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SincVariant {
    /// Standard modified-sinc kernel
    Ms,
    /// Shorter kernel at the cost of reduced stopband suppression and a more
    /// gradual cutoff for degree 2
    Ms1,
}

impl SincVariant {
    fn is_ms1(self) -> bool {
        self == SincVariant::Ms1
    }

    /// Minimum kernel half-width able to represent the sinc oscillations
    fn min_half_width(self, degree: usize) -> usize {
        match self {
            SincVariant::Ms => degree / 2 + 2,
            SincVariant::Ms1 => degree / 2 + 1,
        }
    }
}

/// Correction coefficients for the MS kernels, indexed by `degree/2`, for
/// obtaining a flat passband. The innermost arrays contain a, b, c for the
/// fit kappa = a + b/(c - m)^3. `None` means no correction is required.
const CORRECTION_DATA_MS: [Option<&[[f64; 3]]>; 6] = [
    None, // not defined for degree 0
    None, // no correction required for degree 2
    None, // no correction required for degree 4
    Some(&[[0.001717576, 0.02437382, 1.64375]]),
    Some(&[
        [0.0043993373, 0.088211164, 2.359375],
        [0.006146815, 0.024715371, 3.6359375],
    ]),
    Some(&[
        [0.0011840032, 0.04219344, 2.746875],
        [0.0036718843, 0.12780383, 2.7703125],
    ]),
];

/// Correction coefficients for the MS1 kernels, same layout as for MS.
const CORRECTION_DATA_MS1: [Option<&[[f64; 3]]>; 6] = [
    None, // not defined for degree 0
    None, // no correction required for degree 2
    Some(&[[0.021944195, 0.050284006, 0.765625]]),
    Some(&[
        [0.0018977303, 0.008476806, 1.2625],
        [0.023064667, 0.13047926, 1.2265625],
    ]),
    Some(&[
        [0.0065903002, 0.057929456, 1.915625],
        [0.0023234477, 0.010298849, 2.2726562],
        [0.021046653, 0.16646601, 1.98125],
    ]),
    Some(&[
        [9.749618e-4, 0.0020742896, 3.74375],
        [0.008975366, 0.09902466, 2.7078125],
        [0.0024195414, 0.010064855, 3.296875],
        [0.019185117, 0.18953617, 2.784961],
    ]),
];

/// A modified-sinc smoother with a fixed kernel, reusable across many data
/// arrays.
///
/// # Example
///
/// ```rust
/// use specsmooth::{ModifiedSincSmoother, SincVariant};
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
/// let smoother = ModifiedSincSmoother::new(SincVariant::Ms, 2, 4).unwrap();
/// let smoothed = smoother.smooth(&data);
/// assert_eq!(smoothed.len(), data.len());
/// ```
#[derive(Debug)]
pub struct ModifiedSincSmoother {
    variant: SincVariant,
    degree: usize,
    /// One side of the symmetric kernel, element 0 at the center
    kernel: Vec<f64>,
    /// Hann-squared weights for the boundary linear fit, element 0 at the end
    fit_weights: Vec<f64>,
}

impl ModifiedSincSmoother {
    /// Creates a smoother with the given variant, degree (2, 4, ... 10) and
    /// kernel half-width `m`. The kernel size is `2m + 1`; `m` can be derived
    /// from a desired bandwidth with [`ModifiedSincSmoother::bandwidth_to_m`].
    ///
    /// Constructing once and calling [`smooth`](Self::smooth) repeatedly
    /// avoids rebuilding the kernel and fit weights for each data set;
    /// otherwise [`smooth_once`](Self::smooth_once) is more convenient.
    pub fn new(variant: SincVariant, degree: usize, m: usize) -> Result<Self> {
        if degree < 2 || degree > MAX_DEGREE || degree % 2 != 0 {
            return Err(SmoothError::InvalidDegree(degree));
        }
        let m_min = variant.min_half_width(degree);
        if m < m_min {
            return Err(SmoothError::HalfWidthTooSmall(m, m_min));
        }
        Ok(Self {
            variant,
            degree,
            kernel: make_kernel(variant, degree, m),
            fit_weights: make_fit_weights(variant, degree, m),
        })
    }

    /// The kernel half-width m
    pub fn half_width(&self) -> usize {
        self.kernel.len() - 1
    }

    /// Smooths the data, including the near-boundary points, which are
    /// handled by weighted linear extrapolation of the data before smoothing.
    pub fn smooth(&self, data: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; data.len()];
        self.smooth_into(data, &mut out)
            .expect("output buffer has matching length");
        out
    }

    /// Like [`smooth`](Self::smooth), but writes into a caller-supplied
    /// buffer, which must have the same length as `data`.
    pub fn smooth_into(&self, data: &[f64], out: &mut [f64]) -> Result<()> {
        if out.len() != data.len() {
            return Err(SmoothError::DataLengthMismatch(out.len(), data.len()));
        }
        let radius = self.half_width();
        let extended = self.extend_data(data);
        let mut extended_smoothed = vec![0.0; extended.len()];
        self.convolve(&extended, &mut extended_smoothed);
        out.copy_from_slice(&extended_smoothed[radius..radius + data.len()]);
        Ok(())
    }

    /// Smooths the data except for the near-boundary points. Values within
    /// `m` points of the boundaries, where the convolution is undefined,
    /// remain 0.
    pub fn smooth_except_boundaries(&self, data: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; data.len()];
        self.smooth_except_boundaries_into(data, &mut out)
            .expect("output buffer has matching length");
        out
    }

    /// Like [`smooth_except_boundaries`](Self::smooth_except_boundaries), but
    /// writes into a caller-supplied buffer; entries within `m` points of the
    /// boundaries retain their previous values.
    pub fn smooth_except_boundaries_into(&self, data: &[f64], out: &mut [f64]) -> Result<()> {
        if out.len() != data.len() {
            return Err(SmoothError::DataLengthMismatch(out.len(), data.len()));
        }
        self.convolve(data, out);
        Ok(())
    }

    /// Constructs a smoother and smooths the data once. When smoothing
    /// multiple data sets with the same parameters, using the constructor and
    /// then [`smooth`](Self::smooth) is more efficient.
    pub fn smooth_once(
        data: &[f64],
        variant: SincVariant,
        degree: usize,
        m: usize,
    ) -> Result<Vec<f64>> {
        let smoother = Self::new(variant, degree, m)?;
        Ok(smoother.smooth(data))
    }

    /// Smooths the data in a way comparable to a traditional Savitzky-Golay
    /// filter with the given `degree` and half-width `m`.
    pub fn smooth_like_savitzky_golay(
        data: &[f64],
        variant: SincVariant,
        degree: usize,
        m: usize,
    ) -> Result<Vec<f64>> {
        let bandwidth = savitzky_golay_bandwidth(degree, m);
        let m_ms = Self::bandwidth_to_m(variant, degree, bandwidth)?;
        Self::smooth_once(data, variant, degree, m_ms)
    }

    /// Calculates the kernel half-width m that comes closest to the desired
    /// -3 dB bandwidth (with respect to the sampling frequency; must be below
    /// 0.5, the Nyquist frequency).
    pub fn bandwidth_to_m(variant: SincVariant, degree: usize, bandwidth: f64) -> Result<usize> {
        check_bandwidth(bandwidth)?;
        let radius = if variant.is_ms1() {
            (0.27037 + 0.24920 * degree as f64) / bandwidth - 1.0
        } else {
            (0.74548 + 0.24943 * degree as f64) / bandwidth - 1.0
        };
        Ok(radius.round() as usize)
    }

    /// Calculates the kernel half-width m best suited for obtaining a given
    /// white-noise gain, i.e. the factor by which white noise should be
    /// suppressed.
    pub fn noise_gain_to_m(variant: SincVariant, degree: usize, noise_gain: f64) -> usize {
        let inv_noise_gain_sqr = 1.0 / (noise_gain * noise_gain);
        let exponent = -2.5 - 0.8 * degree as f64;
        let m = if variant.is_ms1() {
            -1.0 + inv_noise_gain_sqr * (0.543 + 0.4974 * degree as f64)
                + 0.47 * inv_noise_gain_sqr.powf(exponent)
        } else {
            -1.0 + inv_noise_gain_sqr * (1.494 + 0.4965 * degree as f64)
                + 0.52 * inv_noise_gain_sqr.powf(exponent)
        };
        m.round() as usize
    }

    /// Convolution with the symmetric half-kernel; positions closer than `m`
    /// to either end of `data` are left untouched in `out`.
    fn convolve(&self, data: &[f64], out: &mut [f64]) {
        let radius = self.half_width();
        for i in radius..data.len().saturating_sub(radius) {
            let mut sum = self.kernel[0] * data[i];
            for j in 1..self.kernel.len() {
                sum += self.kernel[j] * (data[i - j] + data[i + j]);
            }
            out[i] = sum;
        }
    }

    /// Extends the data by `m` points at each end, extrapolated from a
    /// weighted linear fit of the near-end points.
    fn extend_data(&self, data: &[f64]) -> Vec<f64> {
        let m = self.half_width();
        let n = data.len();
        let mut extended = vec![0.0; n + 2 * m];
        extended[m..m + n].copy_from_slice(data);
        let fit_length = self.fit_weights.len().min(n);

        let mut fit = LinearRegression::new();
        for p in 0..fit_length {
            fit.add_point(p as f64, data[p], self.fit_weights[p]);
        }
        let (offset, slope) = fit.line();
        for p in 1..=m {
            extended[m - p] = offset - slope * p as f64;
        }

        fit.clear();
        for p in 0..fit_length {
            fit.add_point(p as f64, data[n - 1 - p], self.fit_weights[p]);
        }
        let (offset, slope) = fit.line();
        for p in 1..=m {
            extended[n + m - 1 + p] = offset - slope * p as f64;
        }
        extended
    }
}

/// Creates one side of the normalized kernel: a sinc multiplied by a
/// Gaussian-like window, plus correction terms that flatten the passband.
fn make_kernel(variant: SincVariant, degree: usize, m: usize) -> Vec<f64> {
    let coeffs = correction_coefficients(variant, degree, m);
    let mut kernel = vec![0.0; m + 1];
    let mut sum = 0.0;
    for i in 0..=m {
        let x = i as f64 / (m + 1) as f64; // 0 at center, 1 past the last kernel point
        let sinc_arg =
            PI * 0.5 * (degree + if variant.is_ms1() { 2 } else { 4 }) as f64 * x;
        let mut k = if i == 0 { 1.0 } else { sinc_arg.sin() / sinc_arg };
        if let Some(coeffs) = &coeffs {
            for (j, &c) in coeffs.iter().enumerate() {
                if variant.is_ms1() {
                    // shorter kernel version, needs more correction terms
                    k += c * x * ((j + 1) as f64 * PI * x).sin();
                } else {
                    // start at 1 for degree 6, 10; at 2 for degree 8
                    let nu = if (degree / 2) % 2 == 0 { 2 } else { 1 };
                    k += c * x * ((2 * j + nu) as f64 * PI * x).sin();
                }
            }
        }
        // decay alpha = 2: 13.5% at the end without correction, 2 sqrt(2) sigma
        let decay = if variant.is_ms1() { 2.0 } else { 4.0 };
        k *= (-x * x * decay).exp()
            + (-sqr(x - 2.0) * decay).exp()
            + (-sqr(x + 2.0) * decay).exp()
            - 2.0 * (-decay).exp()
            - (-9.0 * decay).exp();
        kernel[i] = k;
        sum += k;
        if i > 0 {
            sum += k; // off-center kernel elements appear twice
        }
    }
    for k in kernel.iter_mut() {
        *k *= 1.0 / sum; // normalize the kernel to sum = 1
    }
    kernel
}

/// Returns the correction coefficients for a sinc*Gaussian kernel to flatten
/// the passband, or `None` if no correction is required for the degree.
fn correction_coefficients(variant: SincVariant, degree: usize, m: usize) -> Option<Vec<f64>> {
    let table = if variant.is_ms1() {
        &CORRECTION_DATA_MS1
    } else {
        &CORRECTION_DATA_MS
    };
    let for_degree = table[degree / 2]?;
    Some(
        for_degree
            .iter()
            .map(|&[a, b, c]| {
                let cm = c - m as f64;
                a + b / (cm * cm * cm)
            })
            .collect(),
    )
}

/// Returns the weights for the linear fit used for extrapolation at the ends.
/// The weight function is a Hann (cos^2) window; for beta = 1 it decays to
/// zero at the position of the first zero of the sinc function in the kernel.
/// Larger beta values give stronger noise suppression near the edges, but the
/// smoothed curve follows the input less closely there.
fn make_fit_weights(variant: SincVariant, degree: usize, m: usize) -> Vec<f64> {
    let first_zero = if variant.is_ms1() {
        (m + 1) as f64 / (1.0 + 0.5 * degree as f64)
    } else {
        (m + 1) as f64 / (1.5 + 0.5 * degree as f64)
    };
    let beta = if variant.is_ms1() {
        0.65 + 0.35 * (-0.55 * (degree as f64 - 4.0)).exp()
    } else {
        0.70 + 0.14 * (-0.60 * (degree as f64 - 4.0)).exp()
    };
    let fit_length = (first_zero * beta).ceil() as usize;
    (0..fit_length)
        .map(|p| sqr((0.5 * PI / (first_zero * beta) * p as f64).cos()))
        .collect()
}
