//! Core domain types for the story pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FeedPost
// ---------------------------------------------------------------------------

/// A candidate post as returned by a feed source, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    /// Source-native post identifier.
    pub id: String,
    pub title: String,
    /// Self text; may be empty for link or title-only posts.
    pub body: String,
    pub score: i64,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// StoryRecord
// ---------------------------------------------------------------------------

/// One story as it moves through the stage handoff files.
///
/// Acquisition fills the first block of fields; Transform adds the two
/// romanized fields; Synthesis adds `audio_file`. Fields are serialized in
/// declaration order and unset later-stage fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    /// Unique per source post.
    pub id: String,
    /// Feed the post came from.
    #[serde(default, alias = "subreddit")]
    pub source: String,
    #[serde(default)]
    pub title: String,
    /// Narrative text, capped at the acquisition length limit.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default, alias = "comments")]
    pub comment_count: u64,
    /// ISO-8601 creation time (UTC).
    #[serde(default)]
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_translated_romanized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_translated_romanized: Option<String>,

    /// Path of the narrated audio, set only on successful synthesis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
}

impl StoryRecord {
    /// Ranking key: `score + 2 * comment_count`.
    pub fn engagement(&self) -> i64 {
        engagement_key(self.score, self.comment_count)
    }

    /// The romanized narrative, if present and non-empty.
    pub fn romanized_text(&self) -> Option<&str> {
        self.text_translated_romanized
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Engagement ranking key shared by acquisition and reporting.
pub fn engagement_key(score: i64, comment_count: u64) -> i64 {
    let comments = i64::try_from(comment_count).unwrap_or(i64::MAX / 2);
    score.saturating_add(comments.saturating_mul(2))
}

// ---------------------------------------------------------------------------
// SynthesizedStory
// ---------------------------------------------------------------------------

/// Combined view of a story whose narration was produced successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedStory {
    pub id: String,
    pub source: String,
    pub title: String,
    pub text_translated_romanized: String,
    pub audio_file: String,
}

impl SynthesizedStory {
    /// Combined view of a narrated record; `None` until both the romanized
    /// text and `audio_file` are set.
    pub fn from_record(record: &StoryRecord) -> Option<Self> {
        Some(Self {
            id: record.id.clone(),
            source: record.source.clone(),
            title: record.title.clone(),
            text_translated_romanized: record.romanized_text()?.to_string(),
            audio_file: record.audio_file.clone()?,
        })
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
