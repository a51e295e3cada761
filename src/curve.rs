use log::info;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::paths;
use crate::tracker::RewardTracker;

const CHART_WIDTH: usize = 72;
const CHART_HEIGHT: usize = 16;

/// Renders the end-of-run training-curve report.
///
/// The report is regenerated once, at finalization, from the complete
/// in-memory reward history: per-episode rewards, their moving average,
/// and summary statistics.
pub struct CurveRenderer {
    task_name: String,
    path: PathBuf,
}

impl CurveRenderer {
    pub fn new(task_name: impl Into<String>, path: PathBuf) -> Self {
        CurveRenderer {
            task_name: task_name.into(),
            path,
        }
    }

    pub fn render(&self, tracker: &RewardTracker) -> Result<()> {
        paths::ensure_parent(&self.path)?;
        fs::write(&self.path, self.report(tracker))?;
        info!("Training curve saved to {}", self.path.display());
        Ok(())
    }

    fn report(&self, tracker: &RewardTracker) -> String {
        let mut output = format!("DQN Training: {}\n\n", self.task_name);

        if tracker.is_empty() {
            output.push_str("No episodes recorded.\n");
            return output;
        }

        output.push_str(&plot_series(
            tracker.rewards(),
            "Episode Reward",
            CHART_WIDTH,
            CHART_HEIGHT,
        ));
        output.push('\n');
        output.push_str(&plot_series(
            tracker.moving_avgs(),
            &format!("Moving Average ({} eps)", tracker.window()),
            CHART_WIDTH,
            CHART_HEIGHT,
        ));
        output.push('\n');

        let max_reward = tracker
            .rewards()
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        let best_avg = tracker
            .moving_avgs()
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        output.push_str(&format!("Episodes:    {}\n", tracker.len()));
        output.push_str(&format!("Max reward:  {:.2}\n", max_reward));
        output.push_str(&format!("Best avg:    {:.2}\n", best_avg));
        if let Some(final_avg) = tracker.latest_avg() {
            output.push_str(&format!("Final avg:   {:.2}\n", final_avg));
        }
        output
    }
}

/// Plot a series as ASCII art.
fn plot_series(values: &[f32], title: &str, width: usize, height: usize) -> String {
    if values.is_empty() || width < 10 || height < 5 {
        return format!("{}: no data\n", title);
    }

    let min_val = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if (max_val - min_val).abs() < f32::EPSILON {
        return format!("{}: all values are {:.4}\n", title, min_val);
    }

    let mut plot = vec![vec![' '; width]; height];
    for row in plot.iter_mut() {
        row[0] = '|';
    }
    for j in 0..width {
        plot[height - 1][j] = '-';
    }
    plot[height - 1][0] = '+';

    let x_scale = (values.len().max(2) - 1) as f32 / (width - 3) as f32;
    let y_scale = (height - 3) as f32 / (max_val - min_val);

    for (i, &value) in values.iter().enumerate() {
        let x = ((i as f32 / x_scale) as usize + 2).min(width - 1);
        let y = (height - 3).saturating_sub(((value - min_val) * y_scale) as usize);
        plot[y.min(height - 2)][x] = '*';
    }

    let mut output = format!("{}\n", title);
    output.push_str(&format!("Max: {:.4}\n", max_val));
    for row in plot.iter() {
        output.push_str(&row.iter().collect::<String>());
        output.push('\n');
    }
    output.push_str(&format!("Min: {:.4}\n", min_val));
    output
}
