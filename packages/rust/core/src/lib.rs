//! Pipeline stages and orchestration for StoryVoice.
//!
//! Each stage is a function over records plus the collaborators it needs,
//! returning a [`StageOutput`] whose [`StageReport`] lists every per-record
//! outcome. The stages compose through their JSON handoff files (see
//! [`pipeline::run_pipeline`]) but can also be run one at a time.

pub mod acquisition;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod synthesis;
pub mod transform;

#[cfg(test)]
mod testing;

pub use pipeline::{
    Collaborators, PipelineConfig, PipelineReport, ProgressReporter, SilentProgress, run_pipeline,
};
pub use report::{
    OutcomeStatus, RecordOutcome, SkipReason, SourceError, Stage, StageOutput, StageReport,
};
pub use retry::{RetryPolicy, retry};
