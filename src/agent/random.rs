use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{json, Value};

use super::base::{Agent, Transition};
use super::eval_states::EvalStateRing;
use crate::env::InfoMap;
use crate::error::BoxError;

/// RandomAgent configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RandomAgentConfig {
    pub name: String,
    pub num_actions: usize,
    pub seed: Option<u64>,
    /// Enables state collection during evaluation when set.
    pub eval_steps: Option<usize>,
    /// Number of collected state buffers retained in `info["eval_state"]`.
    pub eval_state_capacity: usize,
}

impl Default for RandomAgentConfig {
    fn default() -> Self {
        RandomAgentConfig {
            name: "random".to_string(),
            num_actions: 2,
            seed: None,
            eval_steps: None,
            eval_state_capacity: 16,
        }
    }
}

/// An agent that selects uniformly at random among `num_actions` discrete
/// actions. It learns nothing, but keeps the bookkeeping a learning agent
/// would expose.
pub struct RandomAgent<S> {
    config: RandomAgentConfig,
    rng: StdRng,
    training: bool,
    updates: u64,
    terminal_updates: u64,
    episodes: u64,
    episode_updates: u64,
    eval_states: EvalStateRing<S>,
    info: InfoMap,
}

impl<S> RandomAgent<S> {
    pub fn new(config: RandomAgentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let eval_states = EvalStateRing::new(config.eval_state_capacity.max(1));
        RandomAgent {
            config,
            rng,
            training: true,
            updates: 0,
            terminal_updates: 0,
            episodes: 0,
            episode_updates: 0,
            eval_states,
            info: InfoMap::new(),
        }
    }

}

impl<S: Serialize> Agent<S, usize> for RandomAgent<S> {
    fn sample_action(&mut self, _state: &S) -> Result<usize, BoxError> {
        if self.config.num_actions == 0 {
            return Err("RandomAgent configured with zero actions".into());
        }
        Ok(self.rng.random_range(0..self.config.num_actions))
    }

    fn update(&mut self, transition: &Transition<'_, S, usize>) -> Result<(), BoxError> {
        self.updates += 1;
        self.episode_updates += 1;
        if transition.done_mask == 0.0 {
            self.terminal_updates += 1;
        }
        self.info
            .insert("terminal_updates".to_string(), Value::from(self.terminal_updates));
        Ok(())
    }

    fn reset(&mut self) {
        self.episodes += 1;
        self.episode_updates = 0;
    }

    fn eval(&mut self) {
        self.training = false;
    }

    fn train(&mut self) {
        self.training = true;
    }

    fn parameters(&self) -> Value {
        json!({
            "training": self.training,
            "updates": self.updates,
            "terminal_updates": self.terminal_updates,
            "episodes": self.episodes,
            "episode_updates": self.episode_updates,
        })
    }

    fn info(&self) -> &InfoMap {
        &self.info
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn eval_steps(&self) -> Option<usize> {
        self.config.eval_steps
    }

    fn record_eval_states(&mut self, states: Vec<S>) -> Result<(), BoxError> {
        self.eval_states.push(states);
        self.info
            .insert("eval_state".to_string(), self.eval_states.to_value()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(num_actions: usize) -> RandomAgent<usize> {
        RandomAgent::new(RandomAgentConfig {
            num_actions,
            seed: Some(42),
            ..Default::default()
        })
    }

    #[test]
    fn test_random_agent_selects_valid_action() {
        let mut agent = seeded(3);
        for _ in 0..100 {
            let action = agent.sample_action(&0).unwrap();
            assert!(action < 3, "action {} out of range", action);
        }
    }

    #[test]
    fn test_zero_actions_is_error() {
        let mut agent = seeded(0);
        assert!(agent.sample_action(&0).is_err());
    }

    #[test]
    fn test_update_counts_terminal_masks() {
        let mut agent = seeded(2);
        let (s, a, ns) = (0usize, 1usize, 1usize);
        for mask in [1.0, 0.0, 1.0] {
            agent
                .update(&Transition {
                    state: &s,
                    action: &a,
                    reward: -1.0,
                    next_state: &ns,
                    done_mask: mask,
                })
                .unwrap();
        }
        assert_eq!(agent.parameters()["updates"], json!(3));
        assert_eq!(agent.parameters()["terminal_updates"], json!(1));
        assert_eq!(agent.info()["terminal_updates"], json!(1));
    }

    #[test]
    fn test_reset_clears_episode_updates() {
        let mut agent = seeded(2);
        let (s, a) = (0usize, 0usize);
        agent.reset();
        agent
            .update(&Transition {
                state: &s,
                action: &a,
                reward: 0.0,
                next_state: &s,
                done_mask: 1.0,
            })
            .unwrap();
        assert_eq!(agent.parameters()["episode_updates"], json!(1));
        agent.reset();
        assert_eq!(agent.parameters()["episode_updates"], json!(0));
        assert_eq!(agent.parameters()["episodes"], json!(2));
    }

    #[test]
    fn test_mode_switch() {
        let mut agent = seeded(2);
        assert_eq!(agent.parameters()["training"], json!(true));
        agent.eval();
        assert_eq!(agent.parameters()["training"], json!(false));
        agent.train();
        assert_eq!(agent.parameters()["training"], json!(true));
    }

    #[test]
    fn test_state_collection_is_opt_in() {
        let plain = seeded(2);
        assert_eq!(plain.eval_steps(), None);

        let mut collecting: RandomAgent<usize> = RandomAgent::new(RandomAgentConfig {
            eval_steps: Some(4),
            eval_state_capacity: 2,
            seed: Some(1),
            ..Default::default()
        });
        assert_eq!(collecting.eval_steps(), Some(4));
        collecting.record_eval_states(vec![0, 1, 2, 3]).unwrap();
        assert_eq!(collecting.info()["eval_state"], json!([[0, 1, 2, 3]]));
        collecting.record_eval_states(vec![4, 5, 6, 7]).unwrap();
        collecting.record_eval_states(vec![8, 9, 10, 11]).unwrap();
        assert_eq!(
            collecting.info()["eval_state"],
            json!([[4, 5, 6, 7], [8, 9, 10, 11]])
        );
    }

    #[test]
    fn test_random_agent_name() {
        let agent = seeded(2);
        assert_eq!(Agent::<usize, usize>::name(&agent), "random");
    }
}
