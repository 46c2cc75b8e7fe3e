//! Sequential runs of the `Chain` / `RandomAgent` pairing described by an
//! [`AppConfig`], folded into one results container.

use std::path::PathBuf;

use serde_json::{json, Value};
use tracing::info;

use crate::agent::{RandomAgent, RandomAgentConfig};
use crate::checkpoint::{CheckpointWriter, ResultsAccumulator};
use crate::config::AppConfig;
use crate::env::{Chain, ChainConfig, InfoMap};
use crate::error::ExperimentError;
use crate::experiment::Experiment;

/// Experiment-level metadata stored alongside the runs.
pub fn experiment_metadata(config: &AppConfig) -> Result<InfoMap, ExperimentError> {
    let mut metadata = InfoMap::new();
    metadata.insert("env_config".to_string(), serde_json::to_value(&config.env)?);
    metadata.insert("agent_config".to_string(), serde_json::to_value(&config.agent)?);
    metadata.insert(
        "experiment_config".to_string(),
        serde_json::to_value(&config.experiment)?,
    );
    metadata.insert("hp_sweep".to_string(), Value::from(config.checkpoint.hp_sweep));
    Ok(metadata)
}

/// Perform `config.checkpoint.runs` runs, merging each finished run into
/// `results`, then write the container once to
/// `save_dir/<env>_<agent>_data_<first run index>.json`.
pub fn run_all(
    config: &AppConfig,
    results: &mut ResultsAccumulator,
) -> Result<PathBuf, ExperimentError> {
    for offset in 0..config.checkpoint.runs {
        let env_config = offset_seed_env(&config.env, offset, 0);
        let eval_env_config = offset_seed_env(&config.env, offset, 1);
        let agent_config = RandomAgentConfig {
            seed: config.agent.seed.map(|s| s.wrapping_add(offset as u64)),
            ..config.agent.clone()
        };

        let mut run_metadata = InfoMap::new();
        run_metadata.insert("agent_seed".to_string(), json!(agent_config.seed));
        run_metadata.insert("env_seed".to_string(), json!(env_config.seed));
        let context = config.checkpoint.sweep_context(
            offset,
            &env_config.name,
            &agent_config.name,
            run_metadata,
        );
        let run_index = context.run_index;

        let agent: RandomAgent<usize> = RandomAgent::new(agent_config);
        let env = Chain::new(env_config);
        let eval_env = Chain::new(eval_env_config);

        let mut experiment =
            Experiment::new(agent, env, eval_env, config.experiment.clone(), context)?;
        experiment.run(results)?;
        results.merge_run(config.checkpoint.hp_sweep, experiment.final_record()?);

        info!(
            run_index,
            episodes = experiment.state().train_episodes,
            "run complete"
        );
    }

    let context = config.checkpoint.sweep_context(
        0,
        &config.env.name,
        &config.agent.name,
        InfoMap::new(),
    );
    let writer = CheckpointWriter::new(context, config.experiment.checkpoint_interval)?;
    Ok(writer.write_results(results)?)
}

/// Per-run environment seeds; the evaluation environment gets its own stream.
fn offset_seed_env(config: &ChainConfig, offset: usize, stream: u64) -> ChainConfig {
    ChainConfig {
        seed: config
            .seed
            .map(|s| s.wrapping_add(offset as u64).wrapping_add(stream << 32)),
        ..config.clone()
    }
}
