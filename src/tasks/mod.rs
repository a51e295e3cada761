//! Task collaborators: the environment boundary the trainer drives.
//!
//! A task bundles an environment (reset/step/close), its observation and
//! action dimensions, observation preprocessing, the function-approximator
//! factory for its agent, and optional lifecycle hooks. Concrete tasks are
//! selected by name through [`TaskRegistry`].

mod cartpole;
mod cliff_walking;
pub(crate) mod matching;

pub use cartpole::CartPole;
pub use cliff_walking::CliffWalking;

use ndarray::Array1;
use serde_json::Value;

use crate::config::Config;
use crate::error::{DeepqError, Result};
use crate::model::QFunction;

/// Result of one environment step.
pub struct StepOutcome {
    pub observation: Array1<f32>,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Value,
}

/// A reinforcement-learning task: environment, dimensions, preprocessing,
/// model factory, and lifecycle hooks.
pub trait Task {
    /// Registry name of the task; also names its output artifacts.
    fn name(&self) -> &str;

    /// Dimension of the (preprocessed) observation vector.
    fn state_size(&self) -> usize;

    /// Number of discrete actions.
    fn action_size(&self) -> usize;

    /// Hyperparameter defaults for this task.
    fn config(&self) -> Config {
        Config::default()
    }

    /// Reset the environment, returning the initial observation and info.
    fn reset(&mut self) -> (Array1<f32>, Value);

    /// Advance the environment by one action.
    fn step(&mut self, action: usize) -> StepOutcome;

    /// Release environment resources.
    fn close(&mut self) {}

    /// Convert a raw observation into the agent's input representation.
    fn preprocess_state(&self, observation: Array1<f32>) -> Array1<f32> {
        observation
    }

    /// Build a fresh function approximator for this task. Invoked twice per
    /// agent: once for the online network, once for the target network.
    fn create_model(&self) -> Box<dyn QFunction>;

    // --- Hooks ---

    fn pre_training(&mut self) -> Result<()> {
        Ok(())
    }

    fn post_training(&mut self) -> Result<()> {
        Ok(())
    }

    fn pre_episode(&mut self, _episode: usize) {}

    fn post_episode(&mut self, _episode: usize, _reward: f32) {}
}

type TaskFactory = fn() -> Box<dyn Task>;

/// Registry mapping task names to constructors.
///
/// Name resolution tries an exact match first, then a unique prefix, then
/// the closest fuzzy match; an ambiguous prefix or a name with no close
/// match is an error.
pub struct TaskRegistry {
    entries: Vec<(String, TaskFactory)>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        TaskRegistry {
            entries: Vec::new(),
        }
    }

    /// Registry pre-populated with the built-in tasks.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        // Built-in registrations cannot collide.
        let _ = registry.register("cartpole", || Box::new(CartPole::new()));
        let _ = registry.register("cliff_walking", || Box::new(CliffWalking::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: TaskFactory) -> Result<()> {
        if self.entries.iter().any(|(n, _)| n == name) {
            return Err(DeepqError::invalid_parameter(
                "name",
                "task is already registered",
            ));
        }
        self.entries.push((name.to_string(), factory));
        Ok(())
    }

    /// Instantiate a task by (possibly partial) name.
    pub fn get(&self, name: &str) -> Result<Box<dyn Task>> {
        let names: Vec<&str> = self.names();
        let resolved = matching::resolve(name, &names)?;
        let factory = self
            .entries
            .iter()
            .find(|(n, _)| n == resolved)
            .map(|(_, f)| *f)
            .ok_or_else(|| DeepqError::UnknownTask {
                name: name.to_string(),
                available: names.join(", "),
            })?;
        Ok(factory())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
