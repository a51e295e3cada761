//! # Deepq - Deep Q-Learning in Rust
//!
//! Deepq trains value-based reinforcement-learning agents (DQN family,
//! including Double DQN) against pluggable tasks, and runs trained agents
//! for evaluation. The learning core - experience replay, epsilon-greedy
//! exploration, dual-network target stabilization, Huber-loss optimization
//! with gradient clipping - is driven by an episodic trainer with
//! checkpointing, cooperative cancellation, and progress callbacks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deepq::trainer::Trainer;
//!
//! let mut trainer = Trainer::new("cartpole")
//!     .expect("task resolves")
//!     .with_episodes(200);
//! trainer.run().expect("training setup succeeds");
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - the DQN learning core (act/remember/learn/sync/persist)
//! - [`config`] - run hyperparameters with documented defaults
//! - [`curve`] - end-of-run training-curve report rendering
//! - [`error`] - error types and result handling
//! - [`infer`] - greedy evaluation of trained agents
//! - [`loss`] - Huber loss used by the learning step
//! - [`model`] - the opaque function-approximator contract
//! - [`network`] - default fully-connected approximator
//! - [`optimizer`] - SGD and Adam parameter updates
//! - [`paths`] - output path resolution conventions
//! - [`replay_memory`] - bounded FIFO experience buffer
//! - [`tasks`] - task trait, registry, and built-in tasks
//! - [`tracker`] - reward history and moving average
//! - [`trainer`] - the episodic training loop

pub mod agent;
pub mod config;
pub mod curve;
pub mod error;
pub mod infer;
pub mod loss;
pub mod model;
pub mod network;
pub mod optimizer;
pub mod paths;
pub mod replay_memory;
pub mod tasks;
pub mod tracker;
pub mod trainer;

#[cfg(test)]
mod tests;
