//! Feed sources for story acquisition.
//!
//! The acquisition stage only sees the [`FeedSource`] trait. [`RedditFeed`] is
//! the production implementation, reading the public JSON listing of a
//! subreddit's "hot" page.

mod listing;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use storyvoice_shared::{FeedClientConfig, FeedPost, Result, StoryVoiceError};
use tracing::{debug, instrument};
use url::Url;

/// Maximum number of redirects to follow for a listing request.
const MAX_REDIRECTS: usize = 3;

/// Largest `limit` the listing API honors.
const MAX_LISTING_LIMIT: u32 = 100;

// ---------------------------------------------------------------------------
// FeedSource
// ---------------------------------------------------------------------------

/// A named set of topical feeds that can be queried for popular posts.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch up to `limit` posts from `source`, in the feed's own hot order.
    async fn fetch_hot(&self, source: &str, limit: u32) -> Result<Vec<FeedPost>>;
}

// ---------------------------------------------------------------------------
// RedditFeed
// ---------------------------------------------------------------------------

/// Reads `/r/<source>/hot.json` listings.
pub struct RedditFeed {
    client: Client,
    base_url: Url,
}

impl RedditFeed {
    /// Build a feed client from runtime config.
    pub fn new(config: &FeedClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            StoryVoiceError::config(format!("invalid feed base URL '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoryVoiceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn listing_url(&self, source: &str) -> Result<Url> {
        self.base_url
            .join(&format!("r/{source}/hot.json"))
            .map_err(|e| StoryVoiceError::config(format!("invalid source name '{source}': {e}")))
    }
}

#[async_trait]
impl FeedSource for RedditFeed {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn fetch_hot(&self, source: &str, limit: u32) -> Result<Vec<FeedPost>> {
        let url = self.listing_url(source)?;
        let limit = limit.min(MAX_LISTING_LIMIT).to_string();

        let response = self
            .client
            .get(url.as_str())
            .query(&[("limit", limit.as_str()), ("raw_json", "1")])
            .send()
            .await
            .map_err(|e| StoryVoiceError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoryVoiceError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoryVoiceError::Network(format!("{url}: failed to read body: {e}")))?;

        let posts = listing::parse_listing(&body)?;
        debug!(source, count = posts.len(), "listing fetched");
        Ok(posts)
    }
}
