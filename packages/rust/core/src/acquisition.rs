//! Acquisition: fetch, filter, deduplicate and rank candidate stories.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use storyvoice_feeds::FeedSource;
use storyvoice_shared::{AcquisitionConfig, FeedPost, Result, StoryRecord, preview};
use tracing::{error, info, instrument, warn};

use crate::pipeline::ProgressReporter;
use crate::report::{RecordOutcome, SkipReason, Stage, StageOutput, StageReport};

/// Timestamp layout written to the record files.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Query every source in order and return the top-N stories by engagement.
///
/// A source that fails to fetch or parse is recorded in the report and
/// skipped; the remaining sources still run.
#[instrument(skip_all, fields(sources = config.sources.len(), top_n = config.top_n))]
pub async fn acquire(
    feed: &dyn FeedSource,
    config: &AcquisitionConfig,
    progress: &dyn ProgressReporter,
) -> StageOutput<StoryRecord> {
    let start = Instant::now();
    let mut report = StageReport::new(Stage::Acquisition);
    progress.stage_started(Stage::Acquisition);
    info!("acquisition started");

    let keywords = normalized_keywords(&config.keywords);
    let mut seen: HashSet<String> = HashSet::new();
    let mut accepted: Vec<StoryRecord> = Vec::new();
    let total = config.sources.len();

    for (i, source) in config.sources.iter().enumerate() {
        progress.item(Stage::Acquisition, source, i + 1, total);

        let posts = match feed.fetch_hot(source, config.fetch_limit).await {
            Ok(posts) => posts,
            Err(e) => {
                report.source_error(source.as_str(), e.to_string());
                continue;
            }
        };
        report.input_count += posts.len();

        let before = accepted.len();
        for post in posts {
            match screen(&post, &keywords, &seen, config.min_length) {
                Ok(()) => {
                    seen.insert(post.id.clone());
                    accepted.push(to_record(source, post, config.max_length));
                }
                Err(reason) => {
                    report.record(RecordOutcome::skipped(Stage::Acquisition, post.id, reason));
                }
            }
        }
        info!(source = %source, accepted = accepted.len() - before, "source processed");
    }

    let selected = select_top(accepted, config.top_n, &mut report);
    for record in &selected {
        report.record(RecordOutcome::succeeded(Stage::Acquisition, record.id.as_str()));
    }

    if selected.is_empty() {
        warn!("no stories survived filtering");
    }

    report.elapsed = start.elapsed();
    report.log_completion();
    progress.stage_finished(&report);

    StageOutput {
        records: selected,
        report,
    }
}

/// [`acquire`], then persist the result to `output` if anything survived.
pub async fn run(
    feed: &dyn FeedSource,
    config: &AcquisitionConfig,
    output: &Path,
    progress: &dyn ProgressReporter,
) -> Result<StageOutput<StoryRecord>> {
    config.validate()?;
    if normalized_keywords(&config.keywords).is_empty() {
        warn!("no keywords configured; every post will be filtered out");
    }
    if config.top_n == 0 {
        warn!("top_n is 0; no stories will be kept");
    }

    let mut result = acquire(feed, config, progress).await;
    if result.records.is_empty() {
        return Ok(result);
    }

    match storyvoice_store::save(output, &result.records) {
        Ok(()) => result.report.output_path = Some(output.to_path_buf()),
        Err(e) => {
            error!(path = %output.display(), error = %e, "failed to save acquired stories");
            result.report.persist_error = Some(e.to_string());
        }
    }

    Ok(result)
}

fn normalized_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// The body, or the title for title-only posts.
fn narrative(post: &FeedPost) -> &str {
    if post.body.trim().is_empty() {
        &post.title
    } else {
        &post.body
    }
}

fn is_relevant(post: &FeedPost, keywords: &[String]) -> bool {
    let haystack = format!("{} {}", post.title, post.body).to_lowercase();
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

/// Relevance, then duplicate id, then minimum narrative length.
fn screen(
    post: &FeedPost,
    keywords: &[String],
    seen: &HashSet<String>,
    min_length: usize,
) -> std::result::Result<(), SkipReason> {
    if !is_relevant(post, keywords) {
        return Err(SkipReason::NotRelevant);
    }
    if seen.contains(&post.id) {
        return Err(SkipReason::Duplicate);
    }
    let chars = narrative(post).chars().count();
    if chars <= min_length {
        return Err(SkipReason::TooShort { chars });
    }
    Ok(())
}

fn to_record(source: &str, post: FeedPost, max_length: usize) -> StoryRecord {
    let text = preview(narrative(&post), max_length).to_string();
    StoryRecord {
        text,
        id: post.id,
        source: source.to_string(),
        title: post.title,
        score: post.score,
        comment_count: post.comment_count,
        timestamp: post.created_at.format(TIMESTAMP_FORMAT).to_string(),
        title_translated_romanized: None,
        text_translated_romanized: None,
        audio_file: None,
    }
}

/// Stable sort by engagement, highest first, and cut at `top_n`.
fn select_top(
    mut records: Vec<StoryRecord>,
    top_n: usize,
    report: &mut StageReport,
) -> Vec<StoryRecord> {
    records.sort_by_key(|r| Reverse(r.engagement()));

    if records.len() > top_n {
        for (offset, dropped) in records.drain(top_n..).enumerate() {
            report.record(RecordOutcome::skipped(
                Stage::Acquisition,
                dropped.id,
                SkipReason::BelowCutoff {
                    rank: top_n + offset + 1,
                },
            ));
        }
    }

    records
}
