use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::env::InfoMap;
use crate::error::CheckpointError;

/// One run's merged statistics, learned parameters and side-channel info.
pub type RunRecord = InfoMap;

/// Key under which the agent's exported parameters are stored in a record.
pub const LEARNED_PARAMS_KEY: &str = "learned_params";

/// All runs recorded under one hyperparameter sweep identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    pub runs: Vec<RunRecord>,
}

/// The results container persisted by every checkpoint: experiment-level
/// metadata plus run records grouped by sweep identifier.
///
/// A checkpoint never mutates the accumulator it is given; it writes a copy
/// with the in-progress run appended. Completed runs are folded in with
/// [`ResultsAccumulator::merge_run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsAccumulator {
    pub experiment: InfoMap,
    pub experiment_data: BTreeMap<usize, SweepResults>,
}

impl ResultsAccumulator {
    pub fn new(experiment: InfoMap) -> Self {
        ResultsAccumulator {
            experiment,
            experiment_data: BTreeMap::new(),
        }
    }

    /// Load a results container previously written by a checkpoint.
    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let json = fs::read_to_string(path).map_err(|e| CheckpointError::ResultsRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| CheckpointError::ResultsParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Append a run record under `hp_sweep`.
    pub fn merge_run(&mut self, hp_sweep: usize, record: RunRecord) {
        self.experiment_data
            .entry(hp_sweep)
            .or_default()
            .runs
            .push(record);
    }

    /// A copy of this container with `record` appended under `hp_sweep`.
    pub fn with_run(&self, hp_sweep: usize, record: RunRecord) -> Self {
        let mut merged = self.clone();
        merged.merge_run(hp_sweep, record);
        merged
    }

    pub fn runs(&self, hp_sweep: usize) -> &[RunRecord] {
        self.experiment_data
            .get(&hp_sweep)
            .map(|s| s.runs.as_slice())
            .unwrap_or(&[])
    }

    pub fn total_runs(&self) -> usize {
        self.experiment_data.values().map(|s| s.runs.len()).sum()
    }
}

/// Sources merged into a run record, in increasing precedence after the
/// base run metadata: agent info, controller info, environment info.
pub struct RecordParts<'a> {
    pub parameters: Value,
    pub agent_info: &'a InfoMap,
    pub controller_info: &'a InfoMap,
    pub env_info: &'a InfoMap,
}

/// Build a run record. On key collisions later sources win.
pub fn build_run_record(run_metadata: &InfoMap, parts: RecordParts<'_>) -> RunRecord {
    let mut record = run_metadata.clone();
    record.insert(LEARNED_PARAMS_KEY.to_string(), parts.parameters);
    for source in [parts.agent_info, parts.controller_info, parts.env_info] {
        for (key, value) in source {
            record.insert(key.clone(), value.clone());
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> InfoMap {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_merge_precedence_env_wins() {
        let base = map(json!({"shared": "base", "seed": 3}));
        let agent = map(json!({"shared": "agent", "entropy": 0.5}));
        let controller = map(json!({"shared": "controller", "train_time": 1.0}));
        let env = map(json!({"shared": "env"}));

        let record = build_run_record(
            &base,
            RecordParts {
                parameters: json!({"w": [1, 2]}),
                agent_info: &agent,
                controller_info: &controller,
                env_info: &env,
            },
        );

        assert_eq!(record["shared"], json!("env"));
        assert_eq!(record["seed"], json!(3));
        assert_eq!(record["entropy"], json!(0.5));
        assert_eq!(record["train_time"], json!(1.0));
        assert_eq!(record[LEARNED_PARAMS_KEY], json!({"w": [1, 2]}));
    }

    #[test]
    fn test_merge_precedence_controller_over_agent() {
        let empty = InfoMap::new();
        let agent = map(json!({"k": 1}));
        let controller = map(json!({"k": 2}));
        let record = build_run_record(
            &empty,
            RecordParts {
                parameters: Value::Null,
                agent_info: &agent,
                controller_info: &controller,
                env_info: &empty,
            },
        );
        assert_eq!(record["k"], json!(2));
    }

    #[test]
    fn test_with_run_leaves_original_untouched() {
        let mut results = ResultsAccumulator::default();
        results.merge_run(0, map(json!({"run": 0})));

        let merged = results.with_run(0, map(json!({"run": 1})));
        assert_eq!(results.runs(0).len(), 1);
        assert_eq!(merged.runs(0).len(), 2);
    }

    #[test]
    fn test_runs_for_unknown_sweep_is_empty() {
        let results = ResultsAccumulator::default();
        assert!(results.runs(9).is_empty());
        assert_eq!(results.total_runs(), 0);
    }

    #[test]
    fn test_sweeps_are_grouped() {
        let mut results = ResultsAccumulator::default();
        results.merge_run(0, InfoMap::new());
        results.merge_run(1, InfoMap::new());
        results.merge_run(1, InfoMap::new());
        assert_eq!(results.runs(0).len(), 1);
        assert_eq!(results.runs(1).len(), 2);
        assert_eq!(results.total_runs(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResultsAccumulator::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CheckpointError::ResultsRead { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        let err = ResultsAccumulator::load(&path).unwrap_err();
        assert!(matches!(err, CheckpointError::ResultsParse { .. }));
    }
}
