//! Full run: acquisition → transform → synthesis through the handoff files.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use storyvoice_feeds::FeedSource;
use storyvoice_services::{SpeechSynthesizer, Translator};
use storyvoice_shared::{
    AcquisitionConfig, AppConfig, Result, SynthesisConfig, SynthesizedStory, TransformConfig,
};
use storyvoice_transliterate::Transliterator;
use tracing::{info, instrument};

use crate::report::{Stage, StageReport};
use crate::{acquisition, synthesis, transform};

/// Progress callback for interactive front ends.
pub trait ProgressReporter: Send + Sync {
    /// Called when a stage begins.
    fn stage_started(&self, stage: Stage);
    /// Called before each feed source or record is processed.
    fn item(&self, stage: Stage, label: &str, current: usize, total: usize);
    /// Called when a stage has finished, successfully or not.
    fn stage_finished(&self, report: &StageReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage_started(&self, _stage: Stage) {}
    fn item(&self, _stage: Stage, _label: &str, _current: usize, _total: usize) {}
    fn stage_finished(&self, _report: &StageReport) {}
}

/// The four external collaborators, constructed once per run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub feed: &'a dyn FeedSource,
    pub translator: &'a dyn Translator,
    pub transliterator: &'a dyn Transliterator,
    pub speech: &'a dyn SpeechSynthesizer,
}

/// Stage settings plus the two handoff file locations.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub acquisition: AcquisitionConfig,
    pub transform: TransformConfig,
    pub synthesis: SynthesisConfig,
    pub acquisition_output: PathBuf,
    pub transform_output: PathBuf,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            acquisition: AcquisitionConfig::from(config),
            transform: TransformConfig::from(config),
            synthesis: SynthesisConfig::from(config),
            acquisition_output: PathBuf::from(&config.acquisition.output_file),
            transform_output: PathBuf::from(&config.transform.output_file),
        }
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    /// One report per stage that ran, in order.
    pub stages: Vec<StageReport>,
    /// Stories with narrated audio.
    pub stories: Vec<SynthesizedStory>,
    pub elapsed: Duration,
}

impl PipelineReport {
    /// True if every stage ran.
    pub fn completed(&self) -> bool {
        self.stages.len() == 3
    }
}

/// Run all three stages.
///
/// Transform re-reads the acquisition file and synthesis re-reads the
/// transform file. The run stops after the first stage that leaves nothing
/// for the next one (no records, or its file could not be written).
#[instrument(skip_all, fields(sources = config.acquisition.sources.len()))]
pub async fn run_pipeline(
    config: &PipelineConfig,
    collaborators: Collaborators<'_>,
    progress: &dyn ProgressReporter,
) -> Result<PipelineReport> {
    let start = Instant::now();
    let mut stages = Vec::with_capacity(3);

    info!("starting full run");

    let acquired = acquisition::run(
        collaborators.feed,
        &config.acquisition,
        &config.acquisition_output,
        progress,
    )
    .await?;
    let proceed = acquired.has_output();
    stages.push(acquired.report);
    if !proceed {
        return Ok(finish(stages, Vec::new(), start));
    }

    let transformed = transform::run(
        &config.acquisition_output,
        &config.transform_output,
        collaborators.translator,
        collaborators.transliterator,
        &config.transform,
        progress,
    )
    .await?;
    let proceed = transformed.has_output();
    stages.push(transformed.report);
    if !proceed {
        return Ok(finish(stages, Vec::new(), start));
    }

    let synthesized = synthesis::run(
        &config.transform_output,
        collaborators.speech,
        &config.synthesis,
        progress,
    )
    .await?;
    stages.push(synthesized.report);

    Ok(finish(stages, synthesized.records, start))
}

fn finish(stages: Vec<StageReport>, stories: Vec<SynthesizedStory>, start: Instant) -> PipelineReport {
    let report = PipelineReport {
        stages,
        stories,
        elapsed: start.elapsed(),
    };

    info!(
        stages_run = report.stages.len(),
        stories = report.stories.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "full run complete"
    );

    report
}
