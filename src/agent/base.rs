use crate::env::InfoMap;
use crate::error::BoxError;

/// A single transition handed to [`Agent::update`].
#[derive(Debug)]
pub struct Transition<'a, S, A> {
    pub state: &'a S,
    pub action: &'a A,
    pub reward: f64,
    pub next_state: &'a S,
    /// 0.0 for a true terminal state, 1.0 when the agent should bootstrap.
    pub done_mask: f64,
}

/// Universal interface for agents driven by the run controller.
pub trait Agent<S, A> {
    /// Select an action for the given state under the current mode.
    fn sample_action(&mut self, state: &S) -> Result<A, BoxError>;

    /// Learn from a single transition.
    fn update(&mut self, transition: &Transition<'_, S, A>) -> Result<(), BoxError>;

    /// Episode-boundary reset, including per-episode telemetry.
    fn reset(&mut self);

    /// Enter evaluation mode (no exploration).
    fn eval(&mut self);

    /// Return to training mode.
    fn train(&mut self);

    /// Everything needed to resume training from this exact point.
    fn parameters(&self) -> serde_json::Value;

    /// Auxiliary information merged into checkpoint records.
    fn info(&self) -> &InfoMap;

    /// Agent name used in checkpoint file names.
    fn name(&self) -> &str;

    /// Number of states to collect with the evaluation policy each time
    /// evaluation runs. `None` opts out of the state-collection pass. Read
    /// once when the run controller is built.
    fn eval_steps(&self) -> Option<usize> {
        None
    }

    /// Receive one complete buffer of `eval_steps` states.
    fn record_eval_states(&mut self, _states: Vec<S>) -> Result<(), BoxError> {
        Ok(())
    }
}
