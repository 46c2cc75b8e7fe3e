use crate::error::BoxError;

/// Auxiliary key/value mapping carried by agents, environments and the run
/// controller, merged into checkpoint records.
pub type InfoMap = serde_json::Map<String, serde_json::Value>;

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct StepOutcome<S> {
    pub next_state: S,
    pub reward: f64,
    /// The episode ended, either at a terminal state or by truncation.
    pub done: bool,
    /// The episode was cut off by the step limit rather than reaching a
    /// terminal state.
    pub steps_exceeded: bool,
    pub info: InfoMap,
}

/// Interface every environment driven by the run controller satisfies.
pub trait Environment {
    type State: Clone;
    type Action;

    /// Start a new episode. Returns the initial state and reset metadata.
    fn reset(&mut self) -> Result<(Self::State, InfoMap), BoxError>;

    /// Advance the environment by one action.
    fn step(&mut self, action: &Self::Action) -> Result<StepOutcome<Self::State>, BoxError>;

    /// Episode length cap. Values <= 1 mean single-step episodes.
    fn steps_per_episode(&self) -> usize;

    /// Auxiliary information merged into every checkpoint record.
    fn info(&self) -> &InfoMap;

    fn set_monitor(&mut self, enabled: bool);

    fn monitor(&self) -> bool;

    /// Environment name used in checkpoint file names.
    fn name(&self) -> &str;
}
