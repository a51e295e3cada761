use log::info;
use std::path::{Path, PathBuf};

use crate::agent::DqnAgent;
use crate::error::Result;
use crate::paths;
use crate::tasks::{Task, TaskRegistry};

/// Run a trained agent greedily for a number of episodes and return the
/// per-episode scores.
///
/// Exploration is disabled. A missing checkpoint logs a warning and the
/// agent runs with fresh parameters; a corrupt checkpoint is a fatal
/// error. Episodes are additionally bounded by the task's `max_steps`.
pub fn evaluate(
    task_name: &str,
    weights_path: Option<&Path>,
    episodes: usize,
) -> Result<Vec<f32>> {
    let registry = TaskRegistry::with_defaults();
    let mut task = registry.get(task_name)?;
    let config = task.config();

    let model_path: PathBuf = match weights_path {
        Some(path) => path.to_path_buf(),
        None => paths::resolve_task_paths(task.name(), None).0,
    };

    let mut agent = {
        let task_ref = &task;
        let factory = || task_ref.create_model();
        DqnAgent::new(task.state_size(), task.action_size(), &config, &factory)?
    };
    agent.load(&model_path)?;
    agent.epsilon = 0.0;

    info!(
        "Starting inference on {} for {} episodes...",
        task.name(),
        episodes
    );

    let mut scores = Vec::with_capacity(episodes);
    for episode in 0..episodes {
        let (observation, _info) = task.reset();
        let mut state = task.preprocess_state(observation);
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut done = false;

        while !done && steps < config.max_steps {
            steps += 1;
            let action = agent.act(state.view(), false);
            let outcome = task.step(action);
            total_reward += outcome.reward;
            done = outcome.terminated || outcome.truncated;
            state = task.preprocess_state(outcome.observation);
        }

        info!(
            "Episode: {}/{} | Score: {:.2}",
            episode + 1,
            episodes,
            total_reward
        );
        scores.push(total_reward);
    }

    task.close();
    info!("Inference completed.");
    Ok(scores)
}
