use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::Array1;
use serde_json::Value;
use tempfile::tempdir;

use deepq::config::Config;
use deepq::infer;
use deepq::tasks::{CartPole, Task, TaskRegistry};
use deepq::trainer::{StopToken, Trainer, TrainingCallbacks};

struct CountingCallbacks {
    steps: Arc<AtomicUsize>,
    episodes: Arc<AtomicUsize>,
    stop_after_first_episode: Option<StopToken>,
}

impl TrainingCallbacks for CountingCallbacks {
    fn on_step(&mut self, _step: usize, _observation: &Array1<f32>, _reward: f32, _info: &Value) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    fn on_episode_end(&mut self, _episode: usize, _steps: usize, _reward: f32) {
        self.episodes.fetch_add(1, Ordering::Relaxed);
        if let Some(token) = &self.stop_after_first_episode {
            token.stop();
        }
    }
}

fn quick_config() -> Config {
    Config {
        episodes: 2,
        max_steps: 30,
        memory_size: 500,
        train_start_size: 16,
        batch_size: 8,
        seed: Some(17),
        ..Config::default()
    }
}

#[test]
fn test_end_to_end_cartpole_training() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    let steps = Arc::new(AtomicUsize::new(0));
    let episodes = Arc::new(AtomicUsize::new(0));
    let callbacks = CountingCallbacks {
        steps: steps.clone(),
        episodes: episodes.clone(),
        stop_after_first_episode: None,
    };

    let mut trainer = Trainer::for_task(Box::new(CartPole::with_seed(1)))
        .with_config(quick_config())
        .with_output_path(dir.path())
        .with_callbacks(Box::new(callbacks));
    trainer.run().unwrap();

    let model_path = dir.path().join("cartpole.bin");
    assert!(model_path.exists());
    assert!(dir.path().join("cartpole.txt").exists());
    assert_eq!(episodes.load(Ordering::Relaxed), 2);
    assert!(steps.load(Ordering::Relaxed) > 2);

    // The persisted checkpoint drives a greedy evaluation run.
    let scores = infer::evaluate("cartpole", Some(&model_path), 3).unwrap();
    assert_eq!(scores.len(), 3);
    for score in scores {
        assert!(score >= 1.0);
    }
}

#[test]
fn test_cancellation_stops_after_first_episode() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    let token = StopToken::new();
    let episodes = Arc::new(AtomicUsize::new(0));
    let callbacks = CountingCallbacks {
        steps: Arc::new(AtomicUsize::new(0)),
        episodes: episodes.clone(),
        stop_after_first_episode: Some(token.clone()),
    };

    let mut trainer = Trainer::for_task(Box::new(CartPole::with_seed(2)))
        .with_config(Config {
            episodes: 50,
            ..quick_config()
        })
        .with_output_path(dir.path())
        .with_callbacks(Box::new(callbacks))
        .with_stop_token(token);
    trainer.run().unwrap();

    // The stop was requested during the first episode's end callback, so
    // later episodes never ran; finalization still rendered the curve.
    assert_eq!(episodes.load(Ordering::Relaxed), 1);
    assert!(dir.path().join("cartpole.txt").exists());
}

#[test]
fn test_evaluation_without_checkpoint_uses_fresh_parameters() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    // Missing weights are non-fatal: the agent runs freshly initialized.
    let missing = dir.path().join("nothing.bin");
    let scores = infer::evaluate("cliff_walking", Some(&missing), 1).unwrap();
    assert_eq!(scores.len(), 1);
}

#[test]
fn test_registry_resolves_partial_names_end_to_end() {
    let registry = TaskRegistry::with_defaults();
    let task = registry.get("cliff").unwrap();
    assert_eq!(task.name(), "cliff_walking");
    assert_eq!(task.state_size(), 48);
}
