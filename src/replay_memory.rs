use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// One step of experience. Never mutated after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// Bounded FIFO buffer of transitions.
///
/// When full, inserting evicts the oldest entry; insertion order defines
/// eviction order. Sampling is uniform without replacement within a batch.
#[derive(Clone)]
pub struct ReplayMemory {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    pub fn new(capacity: usize) -> Self {
        ReplayMemory {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Sample up to `batch_size` distinct transitions using the caller's RNG.
    pub fn sample<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        let mut indices = (0..self.buffer.len()).collect::<Vec<usize>>();
        indices.shuffle(rng);
        indices.truncate(batch_size);
        indices.into_iter().map(|i| &self.buffer[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over stored transitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}
