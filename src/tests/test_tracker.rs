use crate::tracker::RewardTracker;

#[test]
fn test_average_over_short_history() {
    let mut tracker = RewardTracker::new(100);
    assert!((tracker.update(1.0) - 1.0).abs() < 1e-6);
    assert!((tracker.update(3.0) - 2.0).abs() < 1e-6);
    assert_eq!(tracker.len(), 2);
}

#[test]
fn test_average_respects_window() {
    let mut tracker = RewardTracker::new(3);
    tracker.update(1.0);
    tracker.update(2.0);
    tracker.update(3.0);
    // Window slides: only the last three rewards count.
    let avg = tracker.update(4.0);
    assert!((avg - 3.0).abs() < 1e-6);
}

#[test]
fn test_histories_grow_in_lockstep() {
    let mut tracker = RewardTracker::new(10);
    for i in 0..5 {
        tracker.update(i as f32);
    }
    assert_eq!(tracker.rewards().len(), 5);
    assert_eq!(tracker.moving_avgs().len(), 5);
    assert_eq!(tracker.latest_avg(), tracker.moving_avgs().last().copied());
}

#[test]
fn test_empty_tracker() {
    let tracker = RewardTracker::default();
    assert!(tracker.is_empty());
    assert_eq!(tracker.latest_avg(), None);
    assert_eq!(tracker.window(), 100);
}

#[test]
fn test_replaying_same_rewards_gives_same_averages() {
    let rewards = [3.0, 1.0, 4.0, 1.0, 5.0];
    let run = |values: &[f32]| {
        let mut tracker = RewardTracker::new(3);
        values.iter().map(|&r| tracker.update(r)).collect::<Vec<f32>>()
    };
    assert_eq!(run(&rewards), run(&rewards));
}
