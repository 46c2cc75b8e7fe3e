use std::path::Path;

use crate::agent::RandomAgentConfig;
use crate::checkpoint::CheckpointConfig;
use crate::env::ChainConfig;
use crate::error::ConfigError;
use crate::experiment::ExperimentConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub experiment: ExperimentConfig,
    pub checkpoint: CheckpointConfig,
    pub env: ChainConfig,
    pub agent: RandomAgentConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: "info".to_string(),
            experiment: ExperimentConfig::default(),
            checkpoint: CheckpointConfig::default(),
            env: ChainConfig::default(),
            agent: RandomAgentConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.experiment.eval_interval_timesteps == 0 {
            return Err(ConfigError::Validation(
                "experiment.eval_interval_timesteps must be > 0".into(),
            ));
        }
        if self.experiment.checkpoint_interval == 0 {
            return Err(ConfigError::Validation(
                "experiment.checkpoint_interval must be > 0".into(),
            ));
        }
        if self.checkpoint.runs == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.runs must be >= 1".into(),
            ));
        }
        if self.env.length < 2 {
            return Err(ConfigError::Validation("env.length must be >= 2".into()));
        }
        if !(0.0..=1.0).contains(&self.env.slip_probability) {
            return Err(ConfigError::Validation(
                "env.slip_probability must be in [0, 1]".into(),
            ));
        }
        if self.agent.num_actions == 0 {
            return Err(ConfigError::Validation(
                "agent.num_actions must be > 0".into(),
            ));
        }
        if self.agent.eval_steps == Some(0) {
            return Err(ConfigError::Validation(
                "agent.eval_steps must be > 0 when set".into(),
            ));
        }
        if self.agent.eval_state_capacity == 0 {
            return Err(ConfigError::Validation(
                "agent.eval_state_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
