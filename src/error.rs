use std::fmt;

/// Error types for the smoothing filters
#[derive(Debug, Clone, PartialEq)]
pub enum SmoothError {
    /// Degree must be even and within the supported range 2..=10
    InvalidDegree(usize),
    /// Kernel half-width m is below the minimum required for the degree
    HalfWidthTooSmall(usize, usize),
    /// Bandwidth must lie strictly between 0 and 0.5 (the Nyquist frequency)
    InvalidBandwidth(f64),
    /// Penalty derivative order outside the supported range
    InvalidPenaltyOrder(usize),
    /// Input data is too short for the kernel or penalty order
    InsufficientData(usize, usize),
    /// Output buffer or data length does not match the expected length
    DataLengthMismatch(usize, usize),
    /// The penalized matrix is not positive definite (internal invariant violation)
    NotPositiveDefinite,
}

impl fmt::Display for SmoothError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothError::InvalidDegree(degree) => {
                write!(f, "Invalid degree {}; only 2, 4, ... 10 supported", degree)
            }
            SmoothError::HalfWidthTooSmall(m, min) => {
                write!(f, "Invalid kernel half-width {}; must be >= {}", m, min)
            }
            SmoothError::InvalidBandwidth(bandwidth) => {
                write!(
                    f,
                    "Invalid bandwidth {}; must be greater than 0 and below 0.5",
                    bandwidth
                )
            }
            SmoothError::InvalidPenaltyOrder(order) => {
                write!(f, "Invalid penalty derivative order {}", order)
            }
            SmoothError::InsufficientData(len, min) => {
                write!(
                    f,
                    "Insufficient data: {} points, need at least {}",
                    len, min
                )
            }
            SmoothError::DataLengthMismatch(got, expected) => {
                write!(f, "Data length mismatch, {} vs. {}", got, expected)
            }
            SmoothError::NotPositiveDefinite => {
                write!(f, "Cholesky decomposition: matrix is not positive definite")
            }
        }
    }
}

impl std::error::Error for SmoothError {}

/// Result type for smoothing operations
pub type Result<T> = std::result::Result<T, SmoothError>;
