use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::model::QFunction;
use crate::network::QNetwork;
use crate::optimizer::{Adam, OptimizerWrapper};
use crate::tasks::{StepOutcome, Task};

const GRAVITY: f32 = 9.8;
const CART_MASS: f32 = 1.0;
const POLE_MASS: f32 = 0.1;
const TOTAL_MASS: f32 = CART_MASS + POLE_MASS;
// Half the pole length.
const POLE_LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = POLE_MASS * POLE_LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
// 12 degrees.
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;
const X_THRESHOLD: f32 = 2.4;
const EPISODE_LIMIT: usize = 500;

/// Classic cart-pole balancing task: push a cart left or right to keep the
/// pole upright. Reward is 1.0 per step; the episode terminates when the
/// cart or pole leaves its threshold and truncates after 500 steps.
pub struct CartPole {
    state: [f32; 4],
    steps: usize,
    rng: StdRng,
}

impl CartPole {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic variant for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        CartPole {
            state: [0.0; 4],
            steps: 0,
            rng,
        }
    }

    fn observation(&self) -> Array1<f32> {
        array![self.state[0], self.state[1], self.state[2], self.state[3]]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for CartPole {
    fn name(&self) -> &str {
        "cartpole"
    }

    fn state_size(&self) -> usize {
        4
    }

    fn action_size(&self) -> usize {
        2
    }

    fn reset(&mut self) -> (Array1<f32>, Value) {
        for value in self.state.iter_mut() {
            *value = self.rng.gen_range(-0.05..0.05);
        }
        self.steps = 0;
        (self.observation(), Value::Null)
    }

    fn step(&mut self, action: usize) -> StepOutcome {
        let [x, x_dot, theta, theta_dot] = self.state;
        let force = if action == 1 { FORCE_MAG } else { -FORCE_MAG };
        let cos_theta = theta.cos();
        let sin_theta = theta.sin();

        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (POLE_LENGTH * (4.0 / 3.0 - POLE_MASS * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.steps += 1;

        let terminated = self.state[0].abs() > X_THRESHOLD || self.state[2].abs() > THETA_THRESHOLD;
        let truncated = !terminated && self.steps >= EPISODE_LIMIT;

        StepOutcome {
            observation: self.observation(),
            reward: 1.0,
            terminated,
            truncated,
            info: Value::Null,
        }
    }

    fn create_model(&self) -> Box<dyn QFunction> {
        Box::new(QNetwork::new(
            &[self.state_size(), 128, 128, self.action_size()],
            OptimizerWrapper::Adam(Adam::default()),
        ))
    }
}
