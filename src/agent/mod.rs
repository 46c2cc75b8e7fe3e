mod base;
mod eval_states;
mod random;

pub use base::{Agent, Transition};
pub use eval_states::EvalStateRing;
pub use random::{RandomAgent, RandomAgentConfig};
