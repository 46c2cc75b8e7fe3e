//! Environment interface consumed by the run controller, plus the `Chain`
//! corridor used by the CLI.

mod chain;
mod environment;

pub use chain::{Chain, ChainConfig, LEFT, RIGHT};
pub use environment::{Environment, InfoMap, StepOutcome};
