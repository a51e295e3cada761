/// Default moving-average look-back window, in episodes.
pub const DEFAULT_WINDOW: usize = 100;

/// Per-episode reward history with a fixed-window moving average.
///
/// The moving average is the checkpointing signal: the trainer saves the
/// model only when it strictly exceeds the best value seen so far.
#[derive(Debug, Clone)]
pub struct RewardTracker {
    rewards: Vec<f32>,
    moving_avgs: Vec<f32>,
    window: usize,
}

impl RewardTracker {
    pub fn new(window: usize) -> Self {
        RewardTracker {
            rewards: Vec::new(),
            moving_avgs: Vec::new(),
            window: window.max(1),
        }
    }

    /// Record an episode reward and return the updated moving average.
    pub fn update(&mut self, reward: f32) -> f32 {
        self.rewards.push(reward);
        let start = self.rewards.len().saturating_sub(self.window);
        let tail = &self.rewards[start..];
        let avg = tail.iter().sum::<f32>() / tail.len() as f32;
        self.moving_avgs.push(avg);
        avg
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn moving_avgs(&self) -> &[f32] {
        &self.moving_avgs
    }

    pub fn latest_avg(&self) -> Option<f32> {
        self.moving_avgs.last().copied()
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for RewardTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
