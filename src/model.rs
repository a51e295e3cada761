use crate::error::Result;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Contract for a trainable action-value function approximator.
///
/// The agent treats implementations as opaque: it only needs per-action
/// value estimates, one gradient step on the values of taken actions, and
/// an opaque serialized parameter set for target synchronization and
/// checkpointing. Tasks supply implementations through
/// [`Task::create_model`](crate::tasks::Task::create_model), which is
/// invoked twice per agent (online and target network).
pub trait QFunction {
    /// Number of actions the approximator scores.
    fn output_size(&self) -> usize;

    /// Value estimates for a single state. No gradient side effects.
    fn predict(&self, state: ArrayView1<f32>) -> Array1<f32>;

    /// Value estimates for a batch of states. No gradient side effects.
    fn predict_batch(&self, states: ArrayView2<f32>) -> Array2<f32>;

    /// One regression step: fit the value of `actions[i]` in `states[i]`
    /// towards `targets[i]` and return the scalar loss.
    fn fit_actions(
        &mut self,
        states: ArrayView2<f32>,
        actions: &[usize],
        targets: ArrayView1<f32>,
        learning_rate: f32,
    ) -> Result<f32>;

    /// Serialize the trainable parameters.
    fn export_params(&self) -> Result<Vec<u8>>;

    /// Replace the trainable parameters with a previously exported set.
    /// Fails if the serialized shapes do not match this architecture.
    fn import_params(&mut self, bytes: &[u8]) -> Result<()>;
}
