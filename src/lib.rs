//! # Savitzky-Golay replacement smoothers
//!
//! Three interchangeable smoothing filters for equally spaced
//! one-dimensional data (e.g. spectroscopy traces), following
//! M. Schmid, D. Rath and U. Diebold, 'Why and how Savitzky-Golay filters
//! should be replaced', ACS Measurement Science Au 2, 185 (2022):
//!
//! - [`ModifiedSincSmoother`] (MS/MS1): a sinc kernel windowed by a Gaussian,
//!   with correction terms for a flat passband and weighted linear
//!   extrapolation at the boundaries.
//! - [`WeightedSavitzkyGolaySmoother`] (SGW): local polynomial regression
//!   with a tapered weight window and dedicated near-edge kernels; with
//!   [`WeightType::None`] it is a traditional Savitzky-Golay filter.
//! - [`WhittakerHendersonSmoother`] (WH): a penalized-derivative smoother
//!   solved by banded Cholesky factorization in linear time.
//!
//! All three approximate the frequency response of a classical
//! Savitzky-Golay filter of the same polynomial degree while improving
//! stopband suppression or boundary behavior. They can be parameterized
//! directly, via a desired -3 dB bandwidth or white-noise gain, or "like
//! SG(degree, m)" through [`savitzky_golay_bandwidth`].
//!
//! ## Example
//!
//! ```rust
//! use specsmooth::{ModifiedSincSmoother, SincVariant};
//!
//! let data = vec![0.0, 1.0, -2.0, 3.0, -4.0, 5.0, -6.0, 7.0, -8.0, 9.0,
//!                 10.0, 6.0, 3.0, 1.0, 0.0];
//!
//! // reusable smoother: the kernel is built once
//! let smoother = ModifiedSincSmoother::new(SincVariant::Ms, 6, 7)?;
//! let smoothed = smoother.smooth(&data);
//! assert_eq!(smoothed.len(), data.len());
//!
//! // or one-shot, parameterized like a classical SG filter
//! let smoothed = ModifiedSincSmoother::smooth_like_savitzky_golay(
//!     &data, SincVariant::Ms, 6, 7)?;
//! # Ok::<(), specsmooth::SmoothError>(())
//! ```
//!
//! Smoother instances are immutable after construction, so one instance may
//! smooth different data arrays from several threads concurrently.

mod band_matrix;
mod calibration;
mod error;
mod modified_sinc;
mod regression;
mod weighted_sg;
mod whittaker;

pub use calibration::savitzky_golay_bandwidth;
pub use error::{Result, SmoothError};
pub use modified_sinc::{ModifiedSincSmoother, SincVariant, MAX_DEGREE};
pub use weighted_sg::{WeightType, WeightedSavitzkyGolaySmoother};
pub use whittaker::{WhittakerHendersonSmoother, MAX_ORDER};

/// Smooths the data like a traditional Savitzky-Golay filter with the given
/// `degree` and half-width `m`, using the standard modified-sinc kernel.
///
/// This is a convenience wrapper; for repeated smoothing or one of the other
/// engines, construct a smoother explicitly.
///
/// # Example
///
/// ```rust
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
/// let smoothed = specsmooth::smooth(&data, 4, 6).unwrap();
/// assert_eq!(smoothed.len(), data.len());
/// ```
pub fn smooth(data: &[f64], degree: usize, m: usize) -> Result<Vec<f64>> {
    ModifiedSincSmoother::smooth_like_savitzky_golay(data, SincVariant::Ms, degree, m)
}
