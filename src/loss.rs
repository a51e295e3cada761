use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Huber loss (smooth L1): quadratic for residuals within `delta`,
/// linear beyond it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Huber {
    pub delta: f32,
}

impl Huber {
    pub fn new(delta: f32) -> Self {
        Huber { delta }
    }

    /// Mean loss over a vector of residuals (prediction - target).
    pub fn value(&self, residuals: ArrayView1<f32>) -> f32 {
        if residuals.is_empty() {
            return 0.0;
        }
        residuals
            .mapv(|x| {
                let abs_x = x.abs();
                if abs_x <= self.delta {
                    0.5 * x * x
                } else {
                    self.delta * abs_x - 0.5 * self.delta * self.delta
                }
            })
            .sum()
            / residuals.len() as f32
    }

    /// Per-sample gradient of the mean loss with respect to predictions.
    pub fn gradient(&self, residuals: ArrayView1<f32>) -> Array1<f32> {
        let n = residuals.len().max(1) as f32;
        residuals.mapv(|x| {
            if x.abs() <= self.delta {
                x
            } else {
                self.delta * x.signum()
            }
        }) / n
    }
}

impl Default for Huber {
    fn default() -> Self {
        Huber { delta: 1.0 }
    }
}
