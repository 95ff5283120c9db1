//! Listing JSON → [`FeedPost`] conversion.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use storyvoice_shared::{FeedPost, Result, StoryVoiceError};

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RawPost,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    created_utc: f64,
}

/// Parse a listing body. Any post without an id fails the whole listing.
pub(crate) fn parse_listing(body: &str) -> Result<Vec<FeedPost>> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| StoryVoiceError::parse(format!("invalid listing JSON: {e}")))?;

    listing
        .data
        .children
        .into_iter()
        .enumerate()
        .map(|(pos, child)| to_post(pos, child.data))
        .collect()
}

fn to_post(pos: usize, raw: RawPost) -> Result<FeedPost> {
    let id = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| StoryVoiceError::parse(format!("post #{pos} has no id")))?;

    Ok(FeedPost {
        id,
        title: raw.title.trim().to_string(),
        body: normalize_body(raw.selftext.as_deref().unwrap_or_default()),
        score: raw.score,
        comment_count: raw.num_comments,
        created_at: timestamp(raw.created_utc),
    })
}

/// CRLF → LF, collapse runs of blank lines to one, trim.
fn normalize_body(text: &str) -> String {
    let unix = text.replace("\r\n", "\n");
    BLANK_RUNS.replace_all(unix.trim(), "\n\n").into_owned()
}

fn timestamp(epoch_secs: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch_secs.trunc() as i64, 0).unwrap_or_default()
}
