//! Weighted linear regression over a small point set, used for extrapolating
//! the data at the boundaries before modified-sinc convolution.

/// Accumulator for a weighted least-squares line fit `y = offset + slope * x`.
#[derive(Debug, Default)]
pub(crate) struct LinearRegression {
    sum_weights: f64,
    sum_x: f64,
    sum_y: f64,
    sum_xy: f64,
    sum_x2: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the accumulator for a new fit
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Adds a point (x, y) with the given weight
    pub fn add_point(&mut self, x: f64, y: f64, weight: f64) {
        self.sum_weights += weight;
        self.sum_x += weight * x;
        self.sum_y += weight * y;
        self.sum_xy += weight * x * y;
        self.sum_x2 += weight * x * x;
    }

    /// Returns (offset, slope) of the fitted line. If all points share a
    /// single x value the slope is 0.
    pub fn line(&self) -> (f64, f64) {
        let inv_weights = 1.0 / self.sum_weights;
        let var_x_times_n = self.sum_x2 - self.sum_x * self.sum_x * inv_weights;
        let mut slope = (self.sum_xy - self.sum_x * self.sum_y * inv_weights) / var_x_times_n;
        if slope.is_nan() {
            slope = 0.0;
        }
        let offset = (self.sum_y - slope * self.sum_x) * inv_weights;
        (offset, slope)
    }
}
