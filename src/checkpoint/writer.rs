use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::results::{build_run_record, RecordParts, ResultsAccumulator};
use crate::env::InfoMap;
use crate::error::CheckpointError;

/// Where and under which sweep runs are persisted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub save_dir: PathBuf,
    pub hp_sweep: usize,
    /// Index of the first run; later runs count up from it.
    pub run_index: usize,
    /// Number of sequential runs performed by one invocation.
    pub runs: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        CheckpointConfig {
            save_dir: PathBuf::from("results"),
            hp_sweep: 0,
            run_index: 0,
            runs: 1,
        }
    }
}

impl CheckpointConfig {
    /// Context for the `offset`-th run of this invocation.
    pub fn sweep_context(
        &self,
        offset: usize,
        env_name: &str,
        agent_name: &str,
        run_metadata: InfoMap,
    ) -> SweepContext {
        SweepContext {
            hp_sweep: self.hp_sweep,
            run_index: self.run_index + offset,
            save_dir: self.save_dir.clone(),
            env_name: env_name.to_string(),
            agent_name: agent_name.to_string(),
            run_metadata,
        }
    }
}

/// Identifies the run a writer persists: the sweep it belongs to, its index
/// within the sweep, and the names used to build its file name.
#[derive(Debug, Clone)]
pub struct SweepContext {
    pub hp_sweep: usize,
    pub run_index: usize,
    pub save_dir: PathBuf,
    pub env_name: String,
    pub agent_name: String,
    /// Fixed per-run metadata copied into every record.
    pub run_metadata: InfoMap,
}

/// The step-aligned bucket a checkpoint at `step` falls into.
pub fn checkpoint_bucket(step: usize, interval: usize) -> usize {
    step / interval * interval
}

/// Create `path` and its parents. A directory that already exists, including
/// one created concurrently by another process, is not an error.
pub fn ensure_dir(path: &Path) -> Result<(), CheckpointError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Persists the results container, with the current run merged in, into
/// `save_dir/<bucket>/<env>_<agent>_data_<index>.json`.
pub struct CheckpointWriter {
    context: SweepContext,
    checkpoint_interval: usize,
}

impl CheckpointWriter {
    pub fn new(context: SweepContext, checkpoint_interval: usize) -> Result<Self, CheckpointError> {
        if checkpoint_interval == 0 {
            return Err(CheckpointError::InvalidInterval);
        }
        Ok(CheckpointWriter {
            context,
            checkpoint_interval,
        })
    }

    pub fn context(&self) -> &SweepContext {
        &self.context
    }

    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_data_{}.json",
            self.context.env_name, self.context.agent_name, self.context.run_index
        )
    }

    pub fn bucket_dir(&self, bucket: usize) -> PathBuf {
        self.context.save_dir.join(bucket.to_string())
    }

    /// Write a complete checkpoint for `step`. The file for the step's bucket
    /// is replaced wholesale; `results` itself is left unchanged.
    pub fn save(
        &self,
        step: usize,
        results: &ResultsAccumulator,
        parts: RecordParts<'_>,
    ) -> Result<PathBuf, CheckpointError> {
        let bucket = checkpoint_bucket(step, self.checkpoint_interval);
        let record = build_run_record(&self.context.run_metadata, parts);
        let data = results.with_run(self.context.hp_sweep, record);

        let dir = self.bucket_dir(bucket);
        ensure_dir(&dir)?;
        let path = dir.join(self.file_name());
        write_json(&path, &data)?;

        info!(step, bucket, path = %path.display(), "checkpoint saved");
        Ok(path)
    }

    /// Write the final results container directly into `save_dir`.
    pub fn write_results(&self, results: &ResultsAccumulator) -> Result<PathBuf, CheckpointError> {
        ensure_dir(&self.context.save_dir)?;
        let path = self.context.save_dir.join(self.file_name());
        write_json(&path, results)?;
        info!(path = %path.display(), runs = results.total_runs(), "results written");
        Ok(path)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CheckpointError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
