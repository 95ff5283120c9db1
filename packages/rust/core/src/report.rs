//! Per-record outcomes and stage reports.
//!
//! Every stage records one [`RecordOutcome`] per record it saw. Recording an
//! outcome also emits it as a structured `tracing` event with the fields
//! `stage`, `id`, `status` and `reason`, so the companion log holds the same
//! information as the in-memory report.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, error, info, warn};

// ---------------------------------------------------------------------------
// Stage / status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Acquisition,
    Transform,
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acquisition => "acquisition",
            Self::Transform => "transform",
            Self::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Succeeded,
    Skipped,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SkipReason
// ---------------------------------------------------------------------------

/// Why a record did not leave a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No configured keyword in title or body.
    NotRelevant,
    /// Id already accepted earlier in the run.
    Duplicate,
    /// Narrative text at or below the minimum length.
    TooShort { chars: usize },
    /// Ranked past the top-N cut.
    BelowCutoff { rank: usize },
    /// The record itself is unusable (e.g. blank id).
    InvalidRecord(String),
    /// Nothing to narrate.
    NoRomanizedText,
    /// The speech synthesizer returned an error.
    SynthesisFailed(String),
    /// Synthesis reported success but the audio file is empty or missing.
    EmptyAudio,
}

impl SkipReason {
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::InvalidRecord(_) | Self::SynthesisFailed(_) | Self::EmptyAudio => {
                OutcomeStatus::Failed
            }
            _ => OutcomeStatus::Skipped,
        }
    }

    /// Routine acquisition filtering, logged at debug level.
    fn is_filter(&self) -> bool {
        matches!(
            self,
            Self::NotRelevant | Self::Duplicate | Self::TooShort { .. } | Self::BelowCutoff { .. }
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRelevant => f.write_str("no keyword match"),
            Self::Duplicate => f.write_str("duplicate id"),
            Self::TooShort { chars } => write!(f, "text too short ({chars} chars)"),
            Self::BelowCutoff { rank } => write!(f, "ranked #{rank}, below top-N cut"),
            Self::InvalidRecord(msg) => write!(f, "invalid record: {msg}"),
            Self::NoRomanizedText => f.write_str("no romanized text"),
            Self::SynthesisFailed(msg) => write!(f, "synthesis failed: {msg}"),
            Self::EmptyAudio => f.write_str("audio file is empty or missing"),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub id: String,
    pub stage: Stage,
    pub status: OutcomeStatus,
    /// Set for skipped and failed records.
    pub reason: Option<SkipReason>,
}

impl RecordOutcome {
    pub fn succeeded(stage: Stage, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage,
            status: OutcomeStatus::Succeeded,
            reason: None,
        }
    }

    pub fn skipped(stage: Stage, id: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            id: id.into(),
            stage,
            status: reason.status(),
            reason: Some(reason),
        }
    }

    fn emit(&self) {
        let stage = self.stage.as_str();
        let status = self.status.as_str();
        let id = self.id.as_str();

        match &self.reason {
            None => info!(stage, id, status, "record processed"),
            Some(reason) if self.status == OutcomeStatus::Failed => {
                error!(stage, id, status, reason = %reason, "record failed");
            }
            Some(reason) if reason.is_filter() => {
                debug!(stage, id, status, reason = %reason, "record filtered");
            }
            Some(reason) => warn!(stage, id, status, reason = %reason, "record skipped"),
        }
    }
}

// ---------------------------------------------------------------------------
// StageReport
// ---------------------------------------------------------------------------

/// A feed or input file the stage could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub source: String,
    pub message: String,
}

/// Everything that happened during one stage invocation.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    /// Records (or fetched posts, for acquisition) the stage looked at.
    pub input_count: usize,
    pub outcomes: Vec<RecordOutcome>,
    pub source_errors: Vec<SourceError>,
    /// Set once the stage output was persisted.
    pub output_path: Option<PathBuf>,
    /// Set when persisting the output failed.
    pub persist_error: Option<String>,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            input_count: 0,
            outcomes: Vec::new(),
            source_errors: Vec::new(),
            output_path: None,
            persist_error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Log and keep an outcome.
    pub fn record(&mut self, outcome: RecordOutcome) {
        outcome.emit();
        self.outcomes.push(outcome);
    }

    /// Log and keep a source or input failure.
    pub fn source_error(&mut self, source: impl Into<String>, message: impl Into<String>) {
        let error = SourceError {
            source: source.into(),
            message: message.into(),
        };
        warn!(
            stage = self.stage.as_str(),
            source = %error.source,
            error = %error.message,
            "source skipped"
        );
        self.source_errors.push(error);
    }

    /// Log and keep a missing or unreadable stage input file.
    pub fn input_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let error = SourceError {
            source: path.into(),
            message: message.into(),
        };
        error!(
            stage = self.stage.as_str(),
            path = %error.source,
            error = %error.message,
            "stage input unusable"
        );
        self.source_errors.push(error);
    }

    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(OutcomeStatus::Succeeded)
    }

    pub fn skipped(&self) -> usize {
        self.count(OutcomeStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    /// Completion line with per-status counts.
    pub(crate) fn log_completion(&self) {
        info!(
            stage = self.stage.as_str(),
            input = self.input_count,
            succeeded = self.succeeded(),
            skipped = self.skipped(),
            failed = self.failed(),
            source_errors = self.source_errors.len(),
            elapsed_ms = self.elapsed.as_millis() as u64,
            "stage complete"
        );
    }
}

/// Records that made it through a stage, plus the report on all of them.
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub records: Vec<T>,
    pub report: StageReport,
}

impl<T> StageOutput<T> {
    pub(crate) fn empty(report: StageReport) -> Self {
        Self {
            records: Vec::new(),
            report,
        }
    }

    /// True when the next stage has something to work on.
    pub fn has_output(&self) -> bool {
        !self.records.is_empty() && self.report.persist_error.is_none()
    }
}
