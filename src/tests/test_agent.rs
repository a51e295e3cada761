use ndarray::array;
use tempfile::tempdir;

use crate::agent::{double_dqn_targets, dqn_targets, DqnAgent};
use crate::config::Config;
use crate::model::QFunction;
use crate::network::QNetwork;
use crate::optimizer::{OptimizerWrapper, SGD};

fn test_config() -> Config {
    Config {
        batch_size: 4,
        memory_size: 64,
        train_start_size: 8,
        seed: Some(42),
        ..Config::default()
    }
}

fn model_factory() -> Box<dyn QFunction> {
    Box::new(QNetwork::new(&[2, 8, 2], OptimizerWrapper::SGD(SGD::new())))
}

fn test_agent(config: &Config) -> DqnAgent {
    DqnAgent::new(2, 2, config, &model_factory).unwrap()
}

fn fill_memory(agent: &mut DqnAgent, count: usize) {
    for i in 0..count {
        let tag = i as f32 * 0.1;
        agent.remember(array![tag, -tag], i % 2, 1.0, array![tag + 0.1, -tag], false);
    }
}

#[test]
fn test_networks_start_identical() {
    let agent = test_agent(&test_config());
    assert_eq!(
        agent.online_params().unwrap(),
        agent.target_params().unwrap()
    );
}

#[test]
fn test_act_returns_valid_actions() {
    let mut agent = test_agent(&test_config());
    agent.epsilon = 1.0;
    for _ in 0..50 {
        let action = agent.act(array![0.1, 0.2].view(), true);
        assert!(action < 2);
    }
}

#[test]
fn test_zero_epsilon_is_pure_exploitation() {
    let mut agent = test_agent(&test_config());
    agent.epsilon = 0.0;
    let state = array![0.5, -0.5];
    let greedy = agent.act(state.view(), false);
    for _ in 0..50 {
        assert_eq!(agent.act(state.view(), true), greedy);
    }
}

#[test]
fn test_warm_up_guard() {
    let config = test_config();
    let mut agent = test_agent(&config);
    fill_memory(&mut agent, config.train_start_size - 1);

    let before = agent.online_params().unwrap();
    let loss = agent.learn().unwrap();

    assert_eq!(loss, 0.0);
    assert_eq!(agent.online_params().unwrap(), before);
}

#[test]
fn test_learn_updates_online_only() {
    let config = test_config();
    let mut agent = test_agent(&config);
    fill_memory(&mut agent, config.train_start_size);

    let target_before = agent.target_params().unwrap();
    let online_before = agent.online_params().unwrap();
    for _ in 0..5 {
        agent.learn().unwrap();
    }

    // The online network moved; the target is bit-identical until a sync.
    assert_ne!(agent.online_params().unwrap(), online_before);
    assert_eq!(agent.target_params().unwrap(), target_before);

    agent.sync_target().unwrap();
    assert_eq!(
        agent.target_params().unwrap(),
        agent.online_params().unwrap()
    );
}

#[test]
fn test_learn_is_seed_deterministic() {
    let config = test_config();
    let seeded_factory = || -> Box<dyn QFunction> {
        Box::new(QNetwork::seeded(
            &[2, 8, 2],
            OptimizerWrapper::SGD(SGD::new()),
            99,
        ))
    };
    let run = || {
        let mut agent = DqnAgent::new(2, 2, &config, &seeded_factory).unwrap();
        fill_memory(&mut agent, 16);
        let mut losses = Vec::new();
        for _ in 0..3 {
            losses.push(agent.learn().unwrap());
        }
        (losses, agent.online_params().unwrap())
    };

    assert_eq!(run(), run());
}

#[test]
fn test_terminal_targets_equal_reward() {
    // A done transition contributes exactly its reward, for any output of
    // the target network.
    let next_online = array![[10.0, -3.0], [1.0, 2.0], [0.0, 0.0], [5.0, 5.0]];
    let next_target = array![[100.0, 50.0], [1.0, 2.0], [-7.0, 3.0], [9.0, 9.0]];
    let rewards = [5.0, -2.5, 0.0, 1.0];
    let dones = [true, true, true, false];

    let double = double_dqn_targets(&rewards, &dones, next_online.view(), next_target.view(), 0.9);
    assert_eq!(double[0], 5.0);
    assert_eq!(double[1], -2.5);
    assert_eq!(double[2], 0.0);

    let standard = dqn_targets(&rewards, &dones, next_target.view(), 0.9);
    assert_eq!(standard[0], 5.0);
    assert_eq!(standard[1], -2.5);
    assert_eq!(standard[2], 0.0);
}

#[test]
fn test_double_dqn_selects_with_online() {
    // Online prefers action 0, target scores it 2.0; plain max over the
    // target row would have picked 100.0.
    let next_online = array![[9.0, 1.0]];
    let next_target = array![[2.0, 100.0]];
    let targets = double_dqn_targets(&[1.0], &[false], next_online.view(), next_target.view(), 0.5);
    assert!((targets[0] - (1.0 + 0.5 * 2.0)).abs() < 1e-6);

    let standard = dqn_targets(&[1.0], &[false], next_target.view(), 0.5);
    assert!((standard[0] - (1.0 + 0.5 * 100.0)).abs() < 1e-6);
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("agent.bin");

    let agent = test_agent(&test_config());
    agent.save(&path).unwrap();

    let mut other = test_agent(&Config {
        seed: Some(7),
        ..test_config()
    });
    assert_ne!(other.online_params().unwrap(), agent.online_params().unwrap());

    other.load(&path).unwrap();
    assert_eq!(other.online_params().unwrap(), agent.online_params().unwrap());
    // Loading re-syncs the target network.
    assert_eq!(other.target_params().unwrap(), agent.online_params().unwrap());
}

#[test]
fn test_load_missing_file_keeps_parameters() {
    let dir = tempdir().unwrap();
    let mut agent = test_agent(&test_config());
    let before = agent.online_params().unwrap();

    agent.load(&dir.path().join("nothing_here.bin")).unwrap();
    assert_eq!(agent.online_params().unwrap(), before);
}

#[test]
fn test_load_corrupt_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.bin");
    std::fs::write(&path, b"not a parameter dump").unwrap();

    let mut agent = test_agent(&test_config());
    assert!(agent.load(&path).is_err());
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/dir/agent.bin");
    let agent = test_agent(&test_config());
    agent.save(&path).unwrap();
    assert!(path.exists());
}
