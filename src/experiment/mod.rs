//! The run controller: training/evaluation schedule, budget accounting,
//! done-mask computation and checkpoint triggering.

mod controller;
mod episode;
mod run_state;

pub use controller::{EpisodeStats, Experiment, ExperimentConfig};
pub use episode::{collect_eval_states, done_mask, run_episode_eval};
pub use run_state::{EvaluationSession, RunState, RunSummary};
