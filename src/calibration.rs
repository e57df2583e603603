//! Shared calibration formulas and small numeric helpers used by all three
//! smoothing engines.

use crate::error::{Result, SmoothError};

/// Calculates the -3 dB bandwidth of a traditional Savitzky-Golay (SG) filter,
/// i.e. the frequency where the response falls to 1/sqrt(2). The sampling
/// frequency is defined as 1.
///
/// `degree` is the degree of the polynomial fit and `m` the half-width of the
/// SG kernel (the kernel size is `2m + 1`). For degrees up to 10 the accuracy
/// is typically much better than 1%; higher errors occur only for the lowest
/// `m` values where the SG filter is defined (worst case: 4% error at
/// `degree = 10, m = 6`).
///
/// # Example
///
/// ```rust
/// let bandwidth = specsmooth::savitzky_golay_bandwidth(6, 7);
/// assert!(bandwidth > 0.0 && bandwidth < 0.5);
/// ```
pub fn savitzky_golay_bandwidth(degree: usize, m: usize) -> f64 {
    1.0 / (6.352 * (m as f64 + 0.5) / (degree as f64 + 1.379)
        - (0.513 + 0.316 * degree as f64) / (m as f64 + 0.5))
}

/// Returns the square of a number
pub(crate) fn sqr(x: f64) -> f64 {
    x * x
}

/// Checks that a bandwidth lies strictly between 0 and the Nyquist frequency
pub(crate) fn check_bandwidth(bandwidth: f64) -> Result<()> {
    if bandwidth <= 0.0 || bandwidth >= 0.5 {
        return Err(SmoothError::InvalidBandwidth(bandwidth));
    }
    Ok(())
}
