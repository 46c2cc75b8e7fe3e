use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::env::InfoMap;

/// Returns and step counts of one evaluation session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationSession {
    pub returns: Vec<f64>,
    pub steps: Vec<usize>,
}

impl EvaluationSession {
    pub fn with_capacity(episodes: usize) -> Self {
        EvaluationSession {
            returns: Vec::with_capacity(episodes),
            steps: Vec::with_capacity(episodes),
        }
    }

    pub fn record_episode(&mut self, episode_return: f64, steps: usize) {
        self.returns.push(episode_return);
        self.steps.push(steps);
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    pub fn mean_return(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        self.returns.iter().sum::<f64>() / self.returns.len() as f64
    }
}

/// Serializable run statistics, keyed the way downstream analysis expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub train_episode_rewards: Vec<f64>,
    pub train_episode_steps: Vec<usize>,
    pub eval_episode_rewards: Vec<Vec<f64>>,
    pub eval_episode_steps: Vec<Vec<usize>>,
    pub timesteps_at_eval: Vec<usize>,
    /// Seconds.
    pub train_time: f64,
    /// Seconds.
    pub eval_time: f64,
    pub total_train_episodes: usize,
}

/// Everything the run controller accumulates over a run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub timesteps_elapsed: usize,
    pub train_episodes: usize,
    pub timesteps_since_last_eval: usize,
    pub last_checkpoint: usize,
    pub train_ep_return: Vec<f64>,
    pub train_ep_steps: Vec<usize>,
    pub timesteps_at_eval: Vec<usize>,
    pub eval_ep_return: Vec<Vec<f64>>,
    pub eval_ep_steps: Vec<Vec<usize>>,
    pub train_time: Duration,
    pub eval_time: Duration,
    /// Auxiliary named metrics.
    pub info: InfoMap,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_train_episode(&mut self, episode_return: f64, steps: usize, elapsed: Duration) {
        self.train_ep_return.push(episode_return);
        self.train_ep_steps.push(steps);
        self.train_episodes += 1;
        self.train_time += elapsed;
    }

    /// Fold a finished evaluation session in, stamped with the current
    /// timestep.
    pub fn record_evaluation(&mut self, session: EvaluationSession, elapsed: Duration) {
        self.eval_ep_return.push(session.returns);
        self.eval_ep_steps.push(session.steps);
        self.timesteps_at_eval.push(self.timesteps_elapsed);
        self.eval_time += elapsed;
    }

    pub fn set_metric(&mut self, key: &str, value: impl Into<Value>) {
        self.info.insert(key.to_string(), value.into());
    }

    /// Average training return over the last N episodes.
    pub fn average_train_return(&self, last_n: usize) -> f64 {
        let n = self.train_ep_return.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        self.train_ep_return.iter().rev().take(n).sum::<f64>() / n as f64
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            train_episode_rewards: self.train_ep_return.clone(),
            train_episode_steps: self.train_ep_steps.clone(),
            eval_episode_rewards: self.eval_ep_return.clone(),
            eval_episode_steps: self.eval_ep_steps.clone(),
            timesteps_at_eval: self.timesteps_at_eval.clone(),
            train_time: self.train_time.as_secs_f64(),
            eval_time: self.eval_time.as_secs_f64(),
            total_train_episodes: self.train_episodes,
        }
    }

    /// The controller's contribution to a checkpoint record: auxiliary
    /// metrics overlaid with the run summary.
    pub fn controller_info(&self) -> Result<InfoMap, serde_json::Error> {
        let mut info = self.info.clone();
        if let Value::Object(summary) = serde_json::to_value(self.summary())? {
            info.extend(summary);
        }
        Ok(info)
    }
}
