//! Synthesis: narrate each romanized story into its own audio file.

use std::path::Path;
use std::time::Instant;

use storyvoice_services::{SpeechSynthesizer, Voice};
use storyvoice_shared::{
    Result, StoryRecord, StoryVoiceError, SynthesisConfig, SynthesizedStory, preview,
};
use tracing::{error, info, instrument};

use crate::pipeline::ProgressReporter;
use crate::report::{OutcomeStatus, RecordOutcome, SkipReason, Stage, StageOutput, StageReport};

/// Characters of story text included in failure logs.
const LOG_PREVIEW_CHARS: usize = 50;

/// Narrate every record that has romanized text.
///
/// The file for the record at 1-based position `n` of `records` is
/// `story_<n>.<ext>`; skipped records still use up their position.
#[instrument(skip_all, fields(records = records.len(), output_dir = %config.output_dir.display()))]
pub async fn synthesize(
    records: &[StoryRecord],
    speech: &dyn SpeechSynthesizer,
    config: &SynthesisConfig,
    progress: &dyn ProgressReporter,
) -> Result<StageOutput<SynthesizedStory>> {
    let start = Instant::now();
    let mut report = StageReport::new(Stage::Synthesis);
    report.input_count = records.len();
    progress.stage_started(Stage::Synthesis);
    info!("synthesis started");

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| StoryVoiceError::io(&config.output_dir, e))?;

    let voice = Voice {
        lang: config.lang.clone(),
        slow: config.slow,
    };
    let total = records.len();
    let mut stories = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let index = i + 1;
        progress.item(Stage::Synthesis, &record.id, index, total);

        match narrate(record, index, speech, &voice, config).await {
            Ok(story) => {
                report.record(RecordOutcome::succeeded(Stage::Synthesis, record.id.as_str()));
                stories.push(story);
            }
            Err(reason) => {
                if reason.status() == OutcomeStatus::Failed {
                    let text = record.romanized_text().unwrap_or_default();
                    error!(
                        id = %record.id,
                        preview = preview(text, LOG_PREVIEW_CHARS),
                        "could not narrate story"
                    );
                }
                report.record(RecordOutcome::skipped(
                    Stage::Synthesis,
                    record.id.as_str(),
                    reason,
                ));
            }
        }
    }

    report.elapsed = start.elapsed();
    report.log_completion();
    progress.stage_finished(&report);

    Ok(StageOutput {
        records: stories,
        report,
    })
}

async fn narrate(
    record: &StoryRecord,
    index: usize,
    speech: &dyn SpeechSynthesizer,
    voice: &Voice,
    config: &SynthesisConfig,
) -> std::result::Result<SynthesizedStory, SkipReason> {
    let text = record.romanized_text().ok_or(SkipReason::NoRomanizedText)?;
    let path = config.output_path(index);

    speech
        .synthesize(text, voice, &path)
        .await
        .map_err(|e| SkipReason::SynthesisFailed(e.to_string()))?;

    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > 0 => {}
        Ok(_) => {
            let _ = std::fs::remove_file(&path);
            return Err(SkipReason::EmptyAudio);
        }
        Err(_) => return Err(SkipReason::EmptyAudio),
    }

    let narrated = StoryRecord {
        audio_file: Some(path.display().to_string()),
        ..record.clone()
    };
    SynthesizedStory::from_record(&narrated).ok_or(SkipReason::EmptyAudio)
}

/// Load `input` and [`synthesize`] it. Nothing is persisted besides the
/// audio files.
pub async fn run(
    input: &Path,
    speech: &dyn SpeechSynthesizer,
    config: &SynthesisConfig,
    progress: &dyn ProgressReporter,
) -> Result<StageOutput<SynthesizedStory>> {
    match storyvoice_store::load(input) {
        Ok(records) => synthesize(&records, speech, config, progress).await,
        Err(e) if e.is_input_error() => {
            let mut report = StageReport::new(Stage::Synthesis);
            report.input_error(input.display().to_string(), e.to_string());
            progress.stage_finished(&report);
            Ok(StageOutput::empty(report))
        }
        Err(e) => Err(e),
    }
}
