//! # RL Experiment
//!
//! A reinforcement-learning experiment driver. It steps an agent through an
//! environment, interleaves offline evaluation at a fixed timestep interval,
//! and periodically checkpoints run statistics and learned parameters into
//! step-bucketed result files.
//!
//! ## Modules
//!
//! - [`experiment`]: Run controller: train/eval schedule, budgets, done mask
//! - [`checkpoint`]: Results accumulator and bucketed checkpoint writer
//! - [`agent`]: Agent trait, optional state-collection extension, random agent
//! - [`env`]: Environment trait and the `Chain` corridor
//! - [`runner`]: Sequential runs folded into one results file
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod env;
pub mod error;
pub mod experiment;
pub mod runner;
