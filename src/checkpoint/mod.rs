mod results;
mod writer;

pub use results::{
    build_run_record, RecordParts, ResultsAccumulator, RunRecord, SweepResults,
    LEARNED_PARAMS_KEY,
};
pub use writer::{checkpoint_bucket, ensure_dir, CheckpointConfig, CheckpointWriter, SweepContext};
