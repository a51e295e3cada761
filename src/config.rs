use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hyperparameters for a training run.
///
/// A `Config` is created once per run and treated as read-only afterwards;
/// the only fields the trainer fills in before the first episode are the
/// resolved output paths and an optional episode-count override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discount factor for bootstrapped targets
    pub gamma: f32,
    /// Initial exploration rate
    pub epsilon_start: f32,
    /// Exploration rate floor
    pub epsilon_min: f32,
    /// Multiplicative per-episode exploration decay
    pub epsilon_decay: f32,
    /// Optimizer learning rate
    pub learning_rate: f32,
    /// Transitions per gradient step
    pub batch_size: usize,
    /// Replay memory capacity
    pub memory_size: usize,
    /// Minimum stored transitions before learning starts
    pub train_start_size: usize,
    /// Target network sync interval, in episodes
    pub target_update_freq: usize,
    /// Number of training episodes
    pub episodes: usize,
    /// Step ceiling per episode; reaching it forces truncation
    pub max_steps: usize,
    /// Select next actions with the online network, evaluate with the target
    pub use_double_dqn: bool,
    /// Seed for the agent RNG; `None` draws from entropy
    pub seed: Option<u64>,
    /// Resolved checkpoint path, fixed before the run starts
    pub model_path: Option<PathBuf>,
    /// Resolved training-curve path, fixed before the run starts
    pub plot_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gamma: 0.99,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            learning_rate: 0.001,
            batch_size: 64,
            memory_size: 2000,
            train_start_size: 1000,
            target_update_freq: 10,
            episodes: 500,
            max_steps: 200,
            use_double_dqn: true,
            seed: None,
            model_path: None,
            plot_path: None,
        }
    }
}
