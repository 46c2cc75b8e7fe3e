use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use super::environment::{Environment, InfoMap, StepOutcome};
use crate::error::BoxError;

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// Chain environment configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub name: String,
    /// Number of cells; the goal is the last one.
    pub length: usize,
    pub steps_per_episode: usize,
    /// Probability that an action is replaced by its opposite.
    pub slip_probability: f64,
    pub seed: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            name: "chain".to_string(),
            length: 10,
            steps_per_episode: 100,
            slip_probability: 0.0,
            seed: None,
        }
    }
}

/// A one-dimensional corridor. The agent starts in cell 0 and pays -1 per
/// step until it reaches the last cell. Episodes that hit the step limit are
/// truncated.
pub struct Chain {
    config: ChainConfig,
    position: usize,
    episode_steps: usize,
    episodes_completed: u64,
    monitor: bool,
    info: InfoMap,
    rng: StdRng,
}

impl Chain {
    pub fn new(config: ChainConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Chain {
            config,
            position: 0,
            episode_steps: 0,
            episodes_completed: 0,
            monitor: true,
            info: InfoMap::new(),
            rng,
        }
    }

    pub fn goal(&self) -> usize {
        self.config.length.saturating_sub(1)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn record_episode_end(&mut self, truncated: bool) {
        self.episodes_completed += 1;
        if !self.monitor {
            return;
        }
        self.info.insert(
            "episodes_completed".to_string(),
            Value::from(self.episodes_completed),
        );
        let key = if truncated { "truncated_episodes" } else { "goal_episodes" };
        let count = self.info.get(key).and_then(Value::as_u64).unwrap_or(0);
        self.info.insert(key.to_string(), Value::from(count + 1));
    }
}

impl Environment for Chain {
    type State = usize;
    type Action = usize;

    fn reset(&mut self) -> Result<(usize, InfoMap), BoxError> {
        self.position = 0;
        self.episode_steps = 0;
        Ok((self.position, InfoMap::new()))
    }

    fn step(&mut self, action: &usize) -> Result<StepOutcome<usize>, BoxError> {
        if *action > RIGHT {
            return Err(format!("invalid chain action {action} (expected 0 or 1)").into());
        }
        if self.position == self.goal() {
            return Err("step called on a finished episode; call reset first".into());
        }

        let slipped = self.config.slip_probability > 0.0
            && self.rng.random_bool(self.config.slip_probability);
        let direction = if slipped { RIGHT - *action } else { *action };
        self.position = if direction == RIGHT {
            (self.position + 1).min(self.goal())
        } else {
            self.position.saturating_sub(1)
        };
        self.episode_steps += 1;

        let at_goal = self.position == self.goal();
        let steps_exceeded = !at_goal && self.episode_steps >= self.config.steps_per_episode;
        let done = at_goal || steps_exceeded;
        if done {
            self.record_episode_end(steps_exceeded);
        }

        let mut info = InfoMap::new();
        info.insert("steps_exceeded".to_string(), Value::Bool(steps_exceeded));
        Ok(StepOutcome {
            next_state: self.position,
            reward: -1.0,
            done,
            steps_exceeded,
            info,
        })
    }

    fn steps_per_episode(&self) -> usize {
        self.config.steps_per_episode
    }

    fn info(&self) -> &InfoMap {
        &self.info
    }

    fn set_monitor(&mut self, enabled: bool) {
        self.monitor = enabled;
    }

    fn monitor(&self) -> bool {
        self.monitor
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
