use ndarray::{array, Array1};
use serde_json::Value;

use crate::model::QFunction;
use crate::network::QNetwork;
use crate::optimizer::{Adam, OptimizerWrapper};
use crate::tasks::{StepOutcome, Task};

const ROWS: usize = 4;
const COLS: usize = 12;
const NUM_STATES: usize = ROWS * COLS;
const START: usize = (ROWS - 1) * COLS;
const GOAL: usize = NUM_STATES - 1;

const UP: usize = 0;
const RIGHT: usize = 1;
const DOWN: usize = 2;
const LEFT: usize = 3;

/// Cliff-walking gridworld: a 4x12 grid where the agent walks from the
/// bottom-left corner to the bottom-right one. Every step costs -1;
/// stepping onto the cliff along the bottom edge costs -100 and returns the
/// agent to the start. The raw observation is the cell index; preprocessing
/// one-hot encodes it.
pub struct CliffWalking {
    position: usize,
}

impl CliffWalking {
    pub fn new() -> Self {
        CliffWalking { position: START }
    }

    fn is_cliff(position: usize) -> bool {
        position > START && position < GOAL
    }

    fn observation(&self) -> Array1<f32> {
        array![self.position as f32]
    }
}

impl Default for CliffWalking {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for CliffWalking {
    fn name(&self) -> &str {
        "cliff_walking"
    }

    fn state_size(&self) -> usize {
        NUM_STATES
    }

    fn action_size(&self) -> usize {
        4
    }

    fn reset(&mut self) -> (Array1<f32>, Value) {
        self.position = START;
        (self.observation(), Value::Null)
    }

    fn step(&mut self, action: usize) -> StepOutcome {
        let row = self.position / COLS;
        let col = self.position % COLS;
        let (row, col) = match action {
            UP => (row.saturating_sub(1), col),
            RIGHT => (row, (col + 1).min(COLS - 1)),
            DOWN => ((row + 1).min(ROWS - 1), col),
            LEFT => (row, col.saturating_sub(1)),
            _ => (row, col),
        };
        self.position = row * COLS + col;

        let (reward, terminated) = if Self::is_cliff(self.position) {
            self.position = START;
            (-100.0, false)
        } else if self.position == GOAL {
            (-1.0, true)
        } else {
            (-1.0, false)
        };

        StepOutcome {
            observation: self.observation(),
            reward,
            terminated,
            truncated: false,
            info: Value::Null,
        }
    }

    fn preprocess_state(&self, observation: Array1<f32>) -> Array1<f32> {
        let index = observation.get(0).copied().unwrap_or(0.0) as usize;
        let mut one_hot = Array1::zeros(NUM_STATES);
        if index < NUM_STATES {
            one_hot[index] = 1.0;
        }
        one_hot
    }

    fn create_model(&self) -> Box<dyn QFunction> {
        Box::new(QNetwork::new(
            &[self.state_size(), 128, 128, self.action_size()],
            OptimizerWrapper::Adam(Adam::default()),
        ))
    }
}
