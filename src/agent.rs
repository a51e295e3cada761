use log::{info, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::model::QFunction;
use crate::replay_memory::{ReplayMemory, Transition};

/// Deep Q-Network agent with a target network and Double DQN support.
///
/// The agent owns two instances of the task's function approximator: the
/// online network, trained every learning step, and the target network,
/// updated only by explicit hard synchronization from the online one. The
/// target network supplies the bootstrapped value estimates, which keeps
/// the regression targets stable between syncs.
pub struct DqnAgent {
    pub state_size: usize,
    pub action_size: usize,
    /// Exploration rate; decayed by the trainer, never by the agent itself
    pub epsilon: f32,
    gamma: f32,
    learning_rate: f32,
    batch_size: usize,
    train_start_size: usize,
    use_double_dqn: bool,
    online: Box<dyn QFunction>,
    target: Box<dyn QFunction>,
    memory: ReplayMemory,
    rng: StdRng,
}

impl DqnAgent {
    /// Build an agent bound to a task's dimensions. The factory is invoked
    /// twice, once per network, and the target starts as an exact copy of
    /// the online network.
    pub fn new(
        state_size: usize,
        action_size: usize,
        config: &Config,
        model_factory: &dyn Fn() -> Box<dyn QFunction>,
    ) -> Result<Self> {
        let online = model_factory();
        let mut target = model_factory();
        target.import_params(&online.export_params()?)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(DqnAgent {
            state_size,
            action_size,
            epsilon: config.epsilon_start,
            gamma: config.gamma,
            learning_rate: config.learning_rate,
            batch_size: config.batch_size,
            train_start_size: config.train_start_size,
            use_double_dqn: config.use_double_dqn,
            online,
            target,
            memory: ReplayMemory::new(config.memory_size),
            rng,
        })
    }

    /// Select an action. With `explore` set, an epsilon-greedy draw may pick
    /// a uniformly random action without evaluating the network; otherwise
    /// the online network's highest-valued action is returned.
    pub fn act(&mut self, state: ArrayView1<f32>, explore: bool) -> usize {
        if explore && self.rng.gen::<f32>() < self.epsilon {
            return self.rng.gen_range(0..self.action_size);
        }
        let values = self.online.predict(state);
        argmax(values.view())
    }

    /// Store one transition in replay memory.
    pub fn remember(
        &mut self,
        state: Array1<f32>,
        action: usize,
        reward: f32,
        next_state: Array1<f32>,
        done: bool,
    ) {
        self.memory.push(Transition {
            state,
            action,
            reward,
            next_state,
            done,
        });
    }

    /// Sample a batch from memory and take one gradient step on the online
    /// network. Returns the loss, or `0.0` while the memory holds fewer
    /// transitions than the warm-up threshold.
    pub fn learn(&mut self) -> Result<f32> {
        if self.memory.len() < self.train_start_size {
            return Ok(0.0);
        }

        let minibatch = self.memory.sample(self.batch_size, &mut self.rng);
        let batch_size = minibatch.len();

        let mut states = Array2::zeros((batch_size, self.state_size));
        let mut next_states = Array2::zeros((batch_size, self.state_size));
        let mut actions = Vec::with_capacity(batch_size);
        let mut rewards = Vec::with_capacity(batch_size);
        let mut dones = Vec::with_capacity(batch_size);
        for (i, transition) in minibatch.iter().enumerate() {
            states.row_mut(i).assign(&transition.state);
            next_states.row_mut(i).assign(&transition.next_state);
            actions.push(transition.action);
            rewards.push(transition.reward);
            dones.push(transition.done);
        }

        // Targets are computed from forward passes only; no gradients flow
        // through the target network.
        let next_target = self.target.predict_batch(next_states.view());
        let targets = if self.use_double_dqn {
            let next_online = self.online.predict_batch(next_states.view());
            double_dqn_targets(
                &rewards,
                &dones,
                next_online.view(),
                next_target.view(),
                self.gamma,
            )
        } else {
            dqn_targets(&rewards, &dones, next_target.view(), self.gamma)
        };

        self.online
            .fit_actions(states.view(), &actions, targets.view(), self.learning_rate)
    }

    /// Hard-copy the online parameters into the target network.
    pub fn sync_target(&mut self) -> Result<()> {
        self.target.import_params(&self.online.export_params()?)
    }

    /// Number of transitions currently stored.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Serialize the online network parameters to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        crate::paths::ensure_parent(path)?;
        info!("Saving model to {}", path.display());
        fs::write(path, self.online.export_params()?)?;
        Ok(())
    }

    /// Load online network parameters from a file and re-sync the target.
    ///
    /// A missing file is not an error: a warning is logged and the agent
    /// keeps its current parameters. Unreadable content is fatal to the
    /// call.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            warn!("Model file not found: {}", path.display());
            return Ok(());
        }
        info!("Loading model from {}", path.display());
        let bytes = fs::read(path)?;
        self.online.import_params(&bytes)?;
        self.sync_target()
    }

    #[cfg(test)]
    pub(crate) fn online_params(&self) -> Result<Vec<u8>> {
        self.online.export_params()
    }

    #[cfg(test)]
    pub(crate) fn target_params(&self) -> Result<Vec<u8>> {
        self.target.export_params()
    }
}

/// Index of the maximum value, ties resolved to the first occurrence.
pub(crate) fn argmax(values: ArrayView1<f32>) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

/// Bootstrapped targets under the standard DQN rule: the target network both
/// selects and evaluates the next action. Terminal transitions contribute
/// exactly their reward.
pub fn dqn_targets(
    rewards: &[f32],
    dones: &[bool],
    next_target: ArrayView2<f32>,
    gamma: f32,
) -> Array1<f32> {
    let mut targets = Array1::zeros(rewards.len());
    for i in 0..rewards.len() {
        targets[i] = if dones[i] {
            rewards[i]
        } else {
            let max_next = next_target
                .row(i)
                .iter()
                .fold(f32::NEG_INFINITY, |max, &v| max.max(v));
            rewards[i] + gamma * max_next
        };
    }
    targets
}

/// Bootstrapped targets under the Double DQN rule: the online network
/// selects the next action, the target network evaluates it. Terminal
/// transitions contribute exactly their reward.
pub fn double_dqn_targets(
    rewards: &[f32],
    dones: &[bool],
    next_online: ArrayView2<f32>,
    next_target: ArrayView2<f32>,
    gamma: f32,
) -> Array1<f32> {
    let mut targets = Array1::zeros(rewards.len());
    for i in 0..rewards.len() {
        targets[i] = if dones[i] {
            rewards[i]
        } else {
            let best_action = argmax(next_online.row(i));
            rewards[i] + gamma * next_target[[i, best_action]]
        };
    }
    targets
}
