use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::episode::{self, done_mask};
use super::run_state::{EvaluationSession, RunState};
use crate::agent::{Agent, Transition};
use crate::checkpoint::{
    build_run_record, CheckpointWriter, RecordParts, ResultsAccumulator, RunRecord, SweepContext,
};
use crate::env::{Environment, InfoMap};
use crate::error::ExperimentError;

/// Experiment schedule.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Episodes per evaluation session.
    pub eval_episodes: usize,
    pub total_timesteps: usize,
    pub eval_interval_timesteps: usize,
    /// Training episode cap; values <= 0 disable it.
    pub max_episodes: i64,
    /// Timesteps between checkpoints.
    pub checkpoint_interval: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            eval_episodes: 10,
            total_timesteps: 100_000,
            eval_interval_timesteps: 10_000,
            max_episodes: -1,
            checkpoint_interval: 1_000_000,
        }
    }
}

/// Per-episode training statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub episode_return: f64,
    pub steps: usize,
    /// Wall-time of the episode, excluding evaluations run during it.
    pub elapsed: Duration,
}

/// Drives one run: alternates training episodes with offline evaluation,
/// tracks the timestep and episode budgets, and writes periodic checkpoints.
pub struct Experiment<Ag, E> {
    agent: Ag,
    env: E,
    eval_env: E,
    config: ExperimentConfig,
    writer: CheckpointWriter,
    state: RunState,
    eval_steps: Option<usize>,
}

impl<Ag, E> Experiment<Ag, E>
where
    E: Environment,
    Ag: Agent<E::State, E::Action>,
{
    pub fn new(
        agent: Ag,
        env: E,
        mut eval_env: E,
        config: ExperimentConfig,
        context: SweepContext,
    ) -> Result<Self, ExperimentError> {
        eval_env.set_monitor(false);
        let writer = CheckpointWriter::new(context, config.checkpoint_interval)?;
        let eval_steps = agent.eval_steps();
        Ok(Experiment {
            agent,
            env,
            eval_env,
            config,
            writer,
            state: RunState::new(),
            eval_steps,
        })
    }

    pub fn agent(&self) -> &Ag {
        &self.agent
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn eval_env(&self) -> &E {
        &self.eval_env
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn writer(&self) -> &CheckpointWriter {
        &self.writer
    }

    pub fn into_agent(self) -> Ag {
        self.agent
    }

    fn episode_cap_reached(&self) -> bool {
        self.config.max_episodes > 0
            && self.state.train_episodes as i64 >= self.config.max_episodes
    }

    /// Run the experiment: evaluate, train until a budget runs out, evaluate
    /// again. `results` holds previously completed runs; every checkpoint
    /// persists it with this run appended.
    pub fn run(&mut self, results: &ResultsAccumulator) -> Result<(), ExperimentError> {
        let start = Instant::now();
        info!(
            env = self.env.name(),
            agent = self.agent.name(),
            total_timesteps = self.config.total_timesteps,
            "starting experiment"
        );

        self.eval()?;

        let mut episode = 0usize;
        while self.state.timesteps_elapsed < self.config.total_timesteps
            && !self.episode_cap_reached()
        {
            let stats = self.run_episode_train()?;
            self.state
                .record_train_episode(stats.episode_return, stats.steps, stats.elapsed);
            info!(
                episode,
                total_steps = self.state.timesteps_elapsed,
                r = stats.episode_return,
                n_steps = stats.steps,
                elapsed = ?stats.elapsed,
                "train episode"
            );
            episode += 1;

            if self.state.timesteps_elapsed - self.state.last_checkpoint
                >= self.writer.checkpoint_interval()
            {
                self.save_checkpoint(results)?;
                self.state.last_checkpoint = self.state.timesteps_elapsed;
            }
        }

        self.eval()?;

        info!(
            total = ?start.elapsed(),
            train = ?self.state.train_time,
            eval = ?self.state.eval_time,
            episodes = self.state.train_episodes,
            avg_return_100 = self.state.average_train_return(100),
            "experiment finished"
        );
        Ok(())
    }

    /// Run one training episode, stopping early if the timestep budget runs
    /// out. Evaluations due mid-episode run in place and their time is not
    /// counted toward the episode.
    pub fn run_episode_train(&mut self) -> Result<EpisodeStats, ExperimentError> {
        self.agent.reset();

        let start = Instant::now();
        let mut eval_elapsed = Duration::ZERO;
        let mut episode_return = 0.0;
        let mut episode_steps = 0usize;
        let steps_per_episode = self.env.steps_per_episode();

        let (mut state, _) = self.env.reset().map_err(ExperimentError::Environment)?;
        let mut action = self
            .agent
            .sample_action(&state)
            .map_err(ExperimentError::Agent)?;

        loop {
            if self.state.timesteps_since_last_eval >= self.config.eval_interval_timesteps {
                eval_elapsed += self.eval()?;
            }

            let outcome = self.env.step(&action).map_err(ExperimentError::Environment)?;
            episode_steps += 1;
            episode_return += outcome.reward;

            let mask = done_mask(
                steps_per_episode,
                episode_steps,
                outcome.done,
                outcome.steps_exceeded,
            );
            if outcome.done && mask == 0.0 {
                debug!(episode_steps, "episode reached a terminal state");
            }

            self.agent
                .update(&Transition {
                    state: &state,
                    action: &action,
                    reward: outcome.reward,
                    next_state: &outcome.next_state,
                    done_mask: mask,
                })
                .map_err(ExperimentError::Agent)?;
            state = outcome.next_state;

            self.state.timesteps_since_last_eval += 1;
            self.state.timesteps_elapsed += 1;

            if outcome.done || self.state.timesteps_elapsed >= self.config.total_timesteps {
                break;
            }
            action = self
                .agent
                .sample_action(&state)
                .map_err(ExperimentError::Agent)?;
        }

        Ok(EpisodeStats {
            episode_return,
            steps: episode_steps,
            elapsed: start.elapsed().saturating_sub(eval_elapsed),
        })
    }

    /// Evaluate the agent offline for `eval_episodes` episodes, plus the
    /// state-collection pass when the agent opted in. The session is folded
    /// into the run state; returns the time spent.
    pub fn eval(&mut self) -> Result<Duration, ExperimentError> {
        self.state.timesteps_since_last_eval = 0;
        self.agent.eval();

        let mut session = EvaluationSession::with_capacity(self.config.eval_episodes);
        let mut elapsed = Duration::ZERO;

        for i in 0..self.config.eval_episodes {
            let start = Instant::now();
            let (episode_return, steps) = self.run_episode_eval()?;
            let episode_elapsed = start.elapsed();
            elapsed += episode_elapsed;
            session.record_episode(episode_return, steps);
            info!(
                episode = i,
                r = episode_return,
                n_steps = steps,
                elapsed = ?episode_elapsed,
                "eval episode"
            );
        }

        if let Some(eval_steps) = self.eval_steps {
            let start = Instant::now();
            let states =
                episode::collect_eval_states(&mut self.agent, &mut self.eval_env, eval_steps)?;
            self.agent
                .record_eval_states(states)
                .map_err(ExperimentError::Agent)?;
            let collect_elapsed = start.elapsed();
            debug!(elapsed = ?collect_elapsed, "state collection pass");
            elapsed += collect_elapsed;
        }

        self.agent.train();
        info!(
            step = self.state.timesteps_elapsed,
            mean_return = session.mean_return(),
            elapsed = ?elapsed,
            "evaluation finished"
        );
        self.state.record_evaluation(session, elapsed);
        Ok(elapsed)
    }

    /// Run one evaluation episode on the evaluation environment.
    pub fn run_episode_eval(&mut self) -> Result<(f64, usize), ExperimentError> {
        episode::run_episode_eval(&mut self.agent, &mut self.eval_env)
    }

    fn save_checkpoint(&self, results: &ResultsAccumulator) -> Result<(), ExperimentError> {
        let step = self.state.timesteps_elapsed;
        info!(step, "saving checkpoint");
        let controller_info = self
            .state
            .controller_info()
            .map_err(ExperimentError::Serialize)?;
        self.writer
            .save(step, results, self.record_parts(&controller_info))?;
        Ok(())
    }

    fn record_parts<'a>(&'a self, controller_info: &'a InfoMap) -> RecordParts<'a> {
        RecordParts {
            parameters: self.agent.parameters(),
            agent_info: self.agent.info(),
            controller_info,
            env_info: self.env.info(),
        }
    }

    /// The record a checkpoint taken now would persist for this run.
    pub fn final_record(&self) -> Result<RunRecord, ExperimentError> {
        let controller_info = self
            .state
            .controller_info()
            .map_err(ExperimentError::Serialize)?;
        Ok(build_run_record(
            &self.writer.context().run_metadata,
            self.record_parts(&controller_info),
        ))
    }
}
