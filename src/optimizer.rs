use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Gradient-based parameter update, applied one layer at a time.
///
/// Stateful optimizers key their internal state by `layer` index, so the
/// same wrapper instance serves every layer of a network.
pub trait Optimizer {
    fn step(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        weight_grads: &Array2<f32>,
        biases: &mut Array1<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    );
}

#[derive(Serialize, Deserialize, Clone)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn step(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        weight_grads: &Array2<f32>,
        biases: &mut Array1<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    ) {
        match self {
            OptimizerWrapper::SGD(optimizer) => {
                optimizer.step(layer, weights, weight_grads, biases, bias_grads, learning_rate)
            }
            OptimizerWrapper::Adam(optimizer) => {
                optimizer.step(layer, weights, weight_grads, biases, bias_grads, learning_rate)
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn step(
        &mut self,
        _layer: usize,
        weights: &mut Array2<f32>,
        weight_grads: &Array2<f32>,
        biases: &mut Array1<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    ) {
        weights.zip_mut_with(weight_grads, |w, &g| *w -= learning_rate * g);
        biases.zip_mut_with(bias_grads, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam with bias correction. Moment buffers are allocated lazily per layer
/// on the first step that touches that layer.
#[derive(Serialize, Deserialize, Clone)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    steps: Vec<usize>,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            steps: Vec::new(),
        }
    }

    fn ensure_layer(&mut self, layer: usize, weights: &Array2<f32>, biases: &Array1<f32>) {
        while self.m_weights.len() <= layer {
            self.m_weights.push(Array2::zeros((0, 0)));
            self.v_weights.push(Array2::zeros((0, 0)));
            self.m_biases.push(Array1::zeros(0));
            self.v_biases.push(Array1::zeros(0));
            self.steps.push(0);
        }
        if self.m_weights[layer].raw_dim() != weights.raw_dim() {
            self.m_weights[layer] = Array2::zeros(weights.raw_dim());
            self.v_weights[layer] = Array2::zeros(weights.raw_dim());
        }
        if self.m_biases[layer].raw_dim() != biases.raw_dim() {
            self.m_biases[layer] = Array1::zeros(biases.raw_dim());
            self.v_biases[layer] = Array1::zeros(biases.raw_dim());
        }
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        weight_grads: &Array2<f32>,
        biases: &mut Array1<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    ) {
        self.ensure_layer(layer, weights, biases);
        self.steps[layer] += 1;
        let t = self.steps[layer] as i32;

        let beta1 = self.beta1;
        let beta2 = self.beta2;

        let m_w = &mut self.m_weights[layer];
        let v_w = &mut self.v_weights[layer];
        m_w.zip_mut_with(weight_grads, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v_w.zip_mut_with(weight_grads, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let m_hat = m_w.mapv(|m| m / (1.0 - beta1.powi(t)));
        let v_hat = v_w.mapv(|v| v / (1.0 - beta2.powi(t)));
        *weights -= &((&m_hat / (v_hat.mapv(f32::sqrt) + self.epsilon)) * learning_rate);

        let m_b = &mut self.m_biases[layer];
        let v_b = &mut self.v_biases[layer];
        m_b.zip_mut_with(bias_grads, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v_b.zip_mut_with(bias_grads, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let m_hat = m_b.mapv(|m| m / (1.0 - beta1.powi(t)));
        let v_hat = v_b.mapv(|v| v / (1.0 - beta2.powi(t)));
        *biases -= &((&m_hat / (v_hat.mapv(f32::sqrt) + self.epsilon)) * learning_rate);
    }
}
