use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{DeepqError, Result};
use crate::loss::Huber;
use crate::model::QFunction;
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// An enumeration of the activation functions usable in a value network.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Linear,
}

impl Activation {
    fn apply(&self, values: &mut Array2<f32>) {
        match self {
            Activation::Relu => values.mapv_inplace(|v| v.max(0.0)),
            Activation::Linear => {}
        }
    }

    fn derivative(&self, pre_activation: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(pre_activation.raw_dim()),
        }
    }
}

/// A fully connected layer.
///
/// Weights are initialized from a uniform distribution between -0.1 and 0.1,
/// biases with zeros.
#[derive(Clone)]
pub struct Dense {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

impl Dense {
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Dense {
            weights: Array2::random((input_size, output_size), Uniform::new(-0.1, 0.1)),
            biases: Array1::zeros(output_size),
            activation,
        }
    }

    pub fn with_rng<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        Dense {
            weights: Array2::random_using((input_size, output_size), Uniform::new(-0.1, 0.1), rng),
            biases: Array1::zeros(output_size),
            activation,
        }
    }

    fn forward(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.clone().insert_axis(Axis(0));
        self.activation.apply(&mut outputs);
        outputs
    }

    /// Forward pass that also returns the pre-activation values needed for
    /// backpropagation.
    fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, Array2<f32>) {
        let pre = inputs.dot(&self.weights) + &self.biases.clone().insert_axis(Axis(0));
        let mut post = pre.clone();
        self.activation.apply(&mut post);
        (pre, post)
    }
}

/// Serialized form of the trainable parameters.
#[derive(Serialize, Deserialize)]
struct LayerParams {
    weights: Array2<f32>,
    biases: Array1<f32>,
}

/// Default action-value approximator: a fully connected network with ReLU
/// hidden layers and a linear output layer, trained with Huber-loss
/// regression on the taken-action outputs and a global gradient-norm clip.
pub struct QNetwork {
    layers: Vec<Dense>,
    optimizer: OptimizerWrapper,
    huber: Huber,
    clip_norm: f32,
}

impl QNetwork {
    /// Build a network from the given layer sizes. Hidden layers use ReLU,
    /// the output layer is linear.
    pub fn new(layer_sizes: &[usize], optimizer: OptimizerWrapper) -> Self {
        let mut rng = rand::thread_rng();
        Self::build(layer_sizes, optimizer, &mut rng)
    }

    /// Deterministically initialized variant.
    pub fn seeded(layer_sizes: &[usize], optimizer: OptimizerWrapper, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build(layer_sizes, optimizer, &mut rng)
    }

    fn build<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Self {
        assert!(
            layer_sizes.len() >= 2,
            "network needs at least input and output sizes"
        );
        let layers = layer_sizes
            .windows(2)
            .enumerate()
            .map(|(i, window)| {
                let activation = if i == layer_sizes.len() - 2 {
                    Activation::Linear
                } else {
                    Activation::Relu
                };
                Dense::with_rng(window[0], window[1], activation, rng)
            })
            .collect();

        QNetwork {
            layers,
            optimizer,
            huber: Huber::default(),
            clip_norm: 1.0,
        }
    }

    pub fn with_clip_norm(mut self, clip_norm: f32) -> Self {
        self.clip_norm = clip_norm;
        self
    }

    pub fn with_huber(mut self, huber: Huber) -> Self {
        self.huber = huber;
        self
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].weights.nrows()
    }
}

/// Scale all gradients uniformly so their global L2 norm does not exceed
/// `max_norm`.
pub(crate) fn clip_global_norm(
    weight_grads: &mut [Array2<f32>],
    bias_grads: &mut [Array1<f32>],
    max_norm: f32,
) {
    let weight_sq: f32 = weight_grads
        .iter()
        .map(|g| g.iter().map(|&x| x * x).sum::<f32>())
        .sum();
    let bias_sq: f32 = bias_grads
        .iter()
        .map(|g| g.iter().map(|&x| x * x).sum::<f32>())
        .sum();
    let global_norm = (weight_sq + bias_sq).sqrt();

    if global_norm > max_norm {
        let scale = max_norm / global_norm;
        for grad in weight_grads.iter_mut() {
            grad.mapv_inplace(|g| g * scale);
        }
        for grad in bias_grads.iter_mut() {
            grad.mapv_inplace(|g| g * scale);
        }
    }
}

impl QFunction for QNetwork {
    fn output_size(&self) -> usize {
        self.layers
            .last()
            .map(|layer| layer.biases.len())
            .unwrap_or(0)
    }

    fn predict(&self, state: ArrayView1<f32>) -> Array1<f32> {
        let batch = state.insert_axis(Axis(0));
        let output = self.predict_batch(batch);
        output.row(0).to_owned()
    }

    fn predict_batch(&self, states: ArrayView2<f32>) -> Array2<f32> {
        let mut current = states.to_owned();
        for layer in &self.layers {
            current = layer.forward(current.view());
        }
        current
    }

    fn fit_actions(
        &mut self,
        states: ArrayView2<f32>,
        actions: &[usize],
        targets: ArrayView1<f32>,
        learning_rate: f32,
    ) -> Result<f32> {
        let batch_size = states.nrows();
        if batch_size == 0 {
            return Err(DeepqError::EmptyBatch(
                "no states to fit".to_string(),
            ));
        }
        if actions.len() != batch_size || targets.len() != batch_size {
            return Err(DeepqError::invalid_parameter(
                "actions/targets",
                "lengths must match the state batch",
            ));
        }

        // Forward pass, keeping per-layer inputs and pre-activations.
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut pres = Vec::with_capacity(self.layers.len());
        let mut current = states.to_owned();
        for layer in &self.layers {
            let (pre, post) = layer.forward_cached(current.view());
            inputs.push(current);
            pres.push(pre);
            current = post;
        }
        let outputs = current;

        let num_actions = self.output_size();
        let mut residuals = Array1::zeros(batch_size);
        for (i, &action) in actions.iter().enumerate() {
            if action >= num_actions {
                return Err(DeepqError::invalid_parameter(
                    "actions",
                    "action index out of range",
                ));
            }
            residuals[i] = outputs[[i, action]] - targets[i];
        }

        let loss = self.huber.value(residuals.view());
        let residual_grads = self.huber.gradient(residuals.view());

        // Loss only touches the taken-action outputs; everything else
        // receives a zero gradient.
        let mut delta = Array2::zeros(outputs.raw_dim());
        for (i, &action) in actions.iter().enumerate() {
            delta[[i, action]] = residual_grads[i];
        }

        let mut weight_grads = Vec::with_capacity(self.layers.len());
        let mut bias_grads = Vec::with_capacity(self.layers.len());
        for ((layer, input), pre) in self.layers.iter().zip(&inputs).zip(&pres).rev() {
            let adjusted = &delta * &layer.activation.derivative(pre.view());
            weight_grads.push(input.t().dot(&adjusted));
            bias_grads.push(adjusted.sum_axis(Axis(0)));
            delta = adjusted.dot(&layer.weights.t());
        }
        weight_grads.reverse();
        bias_grads.reverse();

        clip_global_norm(&mut weight_grads, &mut bias_grads, self.clip_norm);

        let Self {
            layers, optimizer, ..
        } = self;
        for (i, (layer, (gw, gb))) in layers
            .iter_mut()
            .zip(weight_grads.iter().zip(&bias_grads))
            .enumerate()
        {
            optimizer.step(i, &mut layer.weights, gw, &mut layer.biases, gb, learning_rate);
        }

        Ok(loss)
    }

    fn export_params(&self) -> Result<Vec<u8>> {
        let params: Vec<LayerParams> = self
            .layers
            .iter()
            .map(|layer| LayerParams {
                weights: layer.weights.clone(),
                biases: layer.biases.clone(),
            })
            .collect();
        Ok(bincode::serialize(&params)?)
    }

    fn import_params(&mut self, bytes: &[u8]) -> Result<()> {
        let params: Vec<LayerParams> = bincode::deserialize(bytes)?;
        if params.len() != self.layers.len() {
            return Err(DeepqError::shape_mismatch(
                format!("{} layers", self.layers.len()),
                format!("{} layers", params.len()),
            ));
        }
        for (layer, param) in self.layers.iter().zip(&params) {
            if layer.weights.raw_dim() != param.weights.raw_dim()
                || layer.biases.raw_dim() != param.biases.raw_dim()
            {
                return Err(DeepqError::shape_mismatch(
                    format!("{:?}", layer.weights.shape()),
                    format!("{:?}", param.weights.shape()),
                ));
            }
        }
        for (layer, param) in self.layers.iter_mut().zip(params) {
            layer.weights = param.weights;
            layer.biases = param.biases;
        }
        Ok(())
    }
}
