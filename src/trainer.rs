use log::{error, info, warn};
use ndarray::Array1;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::agent::DqnAgent;
use crate::config::Config;
use crate::curve::CurveRenderer;
use crate::error::Result;
use crate::paths;
use crate::tasks::{Task, TaskRegistry};
use crate::tracker::{RewardTracker, DEFAULT_WINDOW};

/// Observer interface for training progress.
///
/// Callbacks are invoked synchronously from the training loop, strictly
/// one at a time, in step order then episode-end order. They must not
/// block significantly.
pub trait TrainingCallbacks {
    /// Called once with the initial observation and then after every step.
    fn on_step(&mut self, _step: usize, _observation: &Array1<f32>, _reward: f32, _info: &Value) {}

    /// Called after each completed episode.
    fn on_episode_end(&mut self, _episode: usize, _steps: usize, _reward: f32) {}
}

/// Cooperative cancellation flag, polled at every step and episode
/// boundary. Clone it and hand one side to another thread; `stop` takes
/// effect at the next poll.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        StopToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Multiplicative decay towards a floor, applied once per completed
/// episode.
pub fn decay_epsilon(epsilon: f32, epsilon_min: f32, epsilon_decay: f32) -> f32 {
    (epsilon * epsilon_decay).max(epsilon_min)
}

/// The checkpoint gate: only a strict moving-average improvement saves.
pub(crate) fn improved(best: f32, avg: f32) -> bool {
    avg > best
}

/// Manages the training lifecycle for one task.
///
/// The trainer drives episodes, applies the target-sync and exploration
/// schedules, checkpoints on strict moving-average improvement, and always
/// finalizes: hook failures, cancellation, and unexpected episode errors
/// are logged, the task is closed, and the training curve is rendered from
/// the recorded history.
pub struct Trainer {
    task: Box<dyn Task>,
    config: Config,
    output_override: Option<PathBuf>,
    callbacks: Option<Box<dyn TrainingCallbacks>>,
    stop: StopToken,
    tracker: RewardTracker,
    best_avg: f32,
}

impl Trainer {
    /// Resolve a task by name from the default registry.
    pub fn new(task_name: &str) -> Result<Self> {
        let registry = TaskRegistry::with_defaults();
        Ok(Self::for_task(registry.get(task_name)?))
    }

    /// Build a trainer around an already-constructed task.
    pub fn for_task(task: Box<dyn Task>) -> Self {
        let config = task.config();
        Trainer {
            task,
            config,
            output_override: None,
            callbacks: None,
            stop: StopToken::new(),
            tracker: RewardTracker::new(DEFAULT_WINDOW),
            best_avg: f32::NEG_INFINITY,
        }
    }

    /// Override the output location (a model file path or a directory).
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_override = Some(path.into());
        self
    }

    /// Override the episode count.
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.config.episodes = episodes;
        self
    }

    /// Replace the whole hyperparameter set.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_callbacks(mut self, callbacks: Box<dyn TrainingCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn with_stop_token(mut self, token: StopToken) -> Self {
        self.stop = token;
        self
    }

    /// Token observers can use to request a graceful stop.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn best_avg(&self) -> f32 {
        self.best_avg
    }

    /// Execute the full training loop.
    ///
    /// Setup failures abort before any episode and surface as `Err`.
    /// Failures after setup (hooks, episode errors, cancellation) are
    /// logged and end the run gracefully; finalization always happens.
    pub fn run(&mut self) -> Result<()> {
        let (model_path, plot_path) =
            paths::resolve_task_paths(self.task.name(), self.output_override.as_deref());
        self.config.model_path = Some(model_path.clone());
        self.config.plot_path = Some(plot_path.clone());

        let mut agent = match self.initialize(&model_path) {
            Ok(agent) => agent,
            Err(err) => {
                error!("Training setup failed: {}", err);
                self.finalize(&plot_path);
                return Err(err);
            }
        };

        if let Err(err) = self.task.pre_training() {
            error!("Error in pre_training hook: {}", err);
            self.finalize(&plot_path);
            return Ok(());
        }

        for episode in 0..self.config.episodes {
            if self.stop.is_stopped() {
                warn!("Training stop signal received.");
                break;
            }

            match self.run_episode(&mut agent, episode) {
                Ok((reward, steps)) => {
                    if self.stop.is_stopped() {
                        break;
                    }
                    self.update_agent_state(&mut agent, episode);
                    self.log_and_save(&agent, &model_path, episode, steps, reward);
                }
                Err(err) => {
                    error!(
                        "Unexpected error during episode {}: {}",
                        episode + 1,
                        err
                    );
                    break;
                }
            }
        }

        self.finalize(&plot_path);
        Ok(())
    }

    fn initialize(&mut self, model_path: &Path) -> Result<DqnAgent> {
        let task = &self.task;
        let factory = || task.create_model();
        let agent = DqnAgent::new(
            task.state_size(),
            task.action_size(),
            &self.config,
            &factory,
        )?;

        info!("Initialized training for task: {}", self.task.name());
        info!("   Episodes: {}", self.config.episodes);
        info!(
            "   Batch size: {} | LR: {}",
            self.config.batch_size, self.config.learning_rate
        );
        info!("   Output: {}", model_path.display());
        Ok(agent)
    }

    fn run_episode(&mut self, agent: &mut DqnAgent, episode: usize) -> Result<(f32, usize)> {
        self.task.pre_episode(episode);

        let (raw_state, info) = self.task.reset();
        let mut state = self.task.preprocess_state(raw_state.clone());

        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut done = false;

        if let Some(callbacks) = self.callbacks.as_mut() {
            callbacks.on_step(steps, &raw_state, total_reward, &info);
        }

        while !done && !self.stop.is_stopped() {
            steps += 1;
            let action = agent.act(state.view(), true);

            let outcome = self.task.step(action);
            total_reward += outcome.reward;

            // Enforce the step ceiling.
            let truncated = outcome.truncated || steps >= self.config.max_steps;

            if let Some(callbacks) = self.callbacks.as_mut() {
                callbacks.on_step(steps, &outcome.observation, total_reward, &outcome.info);
            }

            let next_state = self.task.preprocess_state(outcome.observation);
            done = outcome.terminated || truncated;

            agent.remember(state, action, outcome.reward, next_state.clone(), done);
            state = next_state;

            agent.learn()?;
        }

        self.task.post_episode(episode, total_reward);
        Ok((total_reward, steps))
    }

    fn update_agent_state(&mut self, agent: &mut DqnAgent, episode: usize) {
        if self.config.target_update_freq > 0 && episode % self.config.target_update_freq == 0 {
            if let Err(err) = agent.sync_target() {
                error!("Failed to sync target network: {}", err);
            }
        }

        agent.epsilon = decay_epsilon(
            agent.epsilon,
            self.config.epsilon_min,
            self.config.epsilon_decay,
        );
    }

    fn log_and_save(
        &mut self,
        agent: &DqnAgent,
        model_path: &Path,
        episode: usize,
        steps: usize,
        reward: f32,
    ) {
        let avg = self.tracker.update(reward);

        if let Some(callbacks) = self.callbacks.as_mut() {
            callbacks.on_episode_end(episode, steps, reward);
        }

        // Verbose warm-up, sparse steady state.
        let should_log = episode < 20 || (episode + 1) % 10 == 0;
        if should_log {
            info!(
                "Ep {:03}/{} | Steps: {:03} | Reward: {:>6.2} | Avg: {:>6.2} | Eps: {:.3}",
                episode + 1,
                self.config.episodes,
                steps,
                reward,
                avg,
                agent.epsilon
            );
        }

        if improved(self.best_avg, avg) {
            info!(
                "New best avg reward: {:.2} (prev: {:.2}). Saving...",
                avg, self.best_avg
            );
            self.best_avg = avg;
            if let Err(err) = agent.save(model_path) {
                error!("Failed to save checkpoint: {}", err);
            }
        }
    }

    fn finalize(&mut self, plot_path: &Path) {
        if let Err(err) = self.task.post_training() {
            error!("Error in post_training hook: {}", err);
        }
        self.task.close();

        let renderer = CurveRenderer::new(self.task.name(), plot_path.to_path_buf());
        if let Err(err) = renderer.render(&self.tracker) {
            error!("Failed to render training curve: {}", err);
        }

        if self.tracker.is_empty() {
            info!("Training session ended.");
        } else {
            info!(
                "Training session ended. Best avg reward: {:.2}",
                self.best_avg
            );
        }
    }
}
