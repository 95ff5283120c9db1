//! Human-readable stage summaries and the terminal progress spinner.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use storyvoice_core::{ProgressReporter, Stage, StageReport};
use storyvoice_shared::{StoryRecord, SynthesizedStory, preview};

/// Characters of story text shown per story.
const PREVIEW_CHARS: usize = 200;

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Acquisition => "Acquisition",
        Stage::Transform => "Transform",
        Stage::Synthesis => "Synthesis",
    }
}

/// Text preview with an ellipsis when it was cut.
fn excerpt(text: &str) -> String {
    let cut = preview(text, PREVIEW_CHARS);
    if cut.len() < text.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

pub(crate) fn print_stage(report: &StageReport) {
    println!();
    println!(
        "  {} ({:.1}s)",
        stage_title(report.stage),
        report.elapsed.as_secs_f64()
    );
    println!("  Input:     {}", report.input_count);
    println!("  Succeeded: {}", report.succeeded());
    println!("  Skipped:   {}", report.skipped());
    println!("  Failed:    {}", report.failed());
    for error in &report.source_errors {
        println!("  Error:     {}: {}", error.source, error.message);
    }
    if let Some(path) = &report.output_path {
        println!("  Output:    {}", path.display());
    }
    if let Some(error) = &report.persist_error {
        println!("  Not saved: {error}");
    }
}

pub(crate) fn print_acquired(records: &[StoryRecord]) {
    if records.is_empty() {
        println!();
        println!("  No stories matched the filters.");
        return;
    }
    println!();
    for (i, record) in records.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, record.source, record.title);
        println!(
            "     {} upvotes, {} comments",
            record.score, record.comment_count
        );
        println!("     {}", excerpt(&record.text));
    }
    println!();
}

pub(crate) fn print_romanized(records: &[StoryRecord]) {
    println!();
    for (i, record) in records.iter().enumerate() {
        println!("  {}. {}", i + 1, record.id);
        if let Some(title) = &record.title_translated_romanized {
            println!("     Title: {title}");
        }
        println!("     Text:  {}", excerpt(record.romanized_text().unwrap_or_default()));
    }
    println!();
}

pub(crate) fn print_narrated(stories: &[SynthesizedStory]) {
    if stories.is_empty() {
        println!();
        println!("  No audio was produced.");
        return;
    }
    println!();
    for (i, story) in stories.iter().enumerate() {
        println!("  {}. {}", i + 1, story.title);
        println!("     Audio: {}", story.audio_file);
        println!("     Text:  {}", excerpt(&story.text_translated_romanized));
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
pub(crate) struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    pub(crate) fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    pub(crate) fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn stage_started(&self, stage: Stage) {
        self.spinner.set_message(format!("{}...", stage_title(stage)));
    }

    fn item(&self, stage: Stage, label: &str, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "{} [{current}/{total}] {label}",
            stage_title(stage)
        ));
    }

    fn stage_finished(&self, report: &StageReport) {
        self.spinner.println(format!(
            "{}: {} succeeded, {} skipped, {} failed",
            stage_title(report.stage),
            report.succeeded(),
            report.skipped(),
            report.failed()
        ));
    }
}
