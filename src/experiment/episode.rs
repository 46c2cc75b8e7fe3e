use tracing::debug;

use crate::agent::Agent;
use crate::env::Environment;
use crate::error::ExperimentError;

/// The 0/1 value handed to the agent's update: 0.0 for a true terminal
/// state, 1.0 whenever the agent should bootstrap (truncated or ongoing).
///
/// Single-step episodes (`steps_per_episode <= 1`) always get 0.0.
pub fn done_mask(
    steps_per_episode: usize,
    episode_steps: usize,
    done: bool,
    steps_exceeded: bool,
) -> f64 {
    if steps_per_episode <= 1 {
        return 0.0;
    }
    if done && episode_steps <= steps_per_episode && !steps_exceeded {
        0.0
    } else {
        1.0
    }
}

/// Play one episode to termination without learning.
/// Returns (episode return, episode steps).
pub fn run_episode_eval<E, A>(agent: &mut A, env: &mut E) -> Result<(f64, usize), ExperimentError>
where
    E: Environment,
    A: Agent<E::State, E::Action> + ?Sized,
{
    let (mut state, _) = env.reset().map_err(ExperimentError::Environment)?;
    let mut episode_return = 0.0;
    let mut episode_steps = 0;

    loop {
        let action = agent.sample_action(&state).map_err(ExperimentError::Agent)?;
        let outcome = env.step(&action).map_err(ExperimentError::Environment)?;
        episode_return += outcome.reward;
        episode_steps += 1;
        if outcome.done {
            break;
        }
        state = outcome.next_state;
    }

    Ok((episode_return, episode_steps))
}

/// Roll the agent's current policy through `env`, resetting as episodes end,
/// until exactly `eval_steps` states (initial states included) are collected.
pub fn collect_eval_states<E, A>(
    agent: &mut A,
    env: &mut E,
    eval_steps: usize,
) -> Result<Vec<E::State>, ExperimentError>
where
    E: Environment,
    A: Agent<E::State, E::Action> + ?Sized,
{
    let mut states = Vec::with_capacity(eval_steps);
    let mut episodes = 0usize;

    while states.len() < eval_steps {
        let (mut state, _) = env.reset().map_err(ExperimentError::Environment)?;
        states.push(state.clone());
        episodes += 1;

        let mut done = false;
        while !done && states.len() < eval_steps {
            let action = agent.sample_action(&state).map_err(ExperimentError::Agent)?;
            let outcome = env.step(&action).map_err(ExperimentError::Environment)?;
            done = outcome.done;
            state = outcome.next_state;
            states.push(state.clone());
        }
    }

    debug!(eval_steps, episodes, "collected evaluation states");
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{RandomAgent, RandomAgentConfig};
    use crate::env::{Chain, ChainConfig};

    #[test]
    fn test_single_step_episodes_always_zero() {
        for spe in [0, 1] {
            for done in [true, false] {
                for exceeded in [true, false] {
                    assert_eq!(done_mask(spe, 1, done, exceeded), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_true_terminal_is_zero() {
        assert_eq!(done_mask(100, 100, true, false), 0.0);
        assert_eq!(done_mask(100, 3, true, false), 0.0);
    }

    #[test]
    fn test_truncation_bootstraps() {
        assert_eq!(done_mask(100, 100, true, true), 1.0);
    }

    #[test]
    fn test_not_done_bootstraps() {
        assert_eq!(done_mask(100, 100, false, false), 1.0);
        assert_eq!(done_mask(100, 5, false, true), 1.0);
    }

    #[test]
    fn test_done_past_limit_bootstraps() {
        assert_eq!(done_mask(100, 101, true, false), 1.0);
    }

    fn chain_env(steps_per_episode: usize) -> Chain {
        Chain::new(ChainConfig {
            length: 4,
            steps_per_episode,
            seed: Some(3),
            ..Default::default()
        })
    }

    fn agent() -> RandomAgent<usize> {
        RandomAgent::new(RandomAgentConfig {
            seed: Some(11),
            ..Default::default()
        })
    }

    #[test]
    fn test_run_episode_eval_terminates() {
        let mut env = chain_env(20);
        let mut agent = agent();
        let (ret, steps) = run_episode_eval(&mut agent, &mut env).unwrap();
        assert!(steps >= 1 && steps <= 20);
        assert_eq!(ret, -(steps as f64));
    }

    #[test]
    fn test_collect_eval_states_exact_length() {
        let mut env = chain_env(2);
        let mut agent = agent();
        let states = collect_eval_states(&mut agent, &mut env, 7).unwrap();
        assert_eq!(states.len(), 7);
        assert_eq!(states[0], 0, "first state is a reset state");
    }

    #[test]
    fn test_collect_zero_states() {
        let mut env = chain_env(2);
        let mut agent = agent();
        assert!(collect_eval_states(&mut agent, &mut env, 0).unwrap().is_empty());
    }
}
