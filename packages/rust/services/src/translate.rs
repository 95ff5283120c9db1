//! Text translation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use storyvoice_shared::{Result, StoryVoiceError, preview};
use tracing::{debug, instrument};
use url::Url;

/// Translates text into a target language.
///
/// Implementations must be safe to call again with identical input after a
/// failure; the transform stage retries on error.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

/// Client for the `translate_a/single` web endpoint.
pub struct GoogleTranslator {
    client: Client,
    endpoint: Url,
}

impl GoogleTranslator {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let (client, base) = crate::build_client(base_url, timeout_secs)?;
        let endpoint = base.join("translate_a/single").map_err(|e| {
            StoryVoiceError::config(format!("invalid translate URL '{base_url}': {e}"))
        })?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    #[instrument(skip_all, fields(target_lang = %target_lang, chars = text.chars().count()))]
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint.as_str())
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| StoryVoiceError::Translation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoryVoiceError::Translation(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoryVoiceError::Translation(format!("failed to read body: {e}")))?;

        let translated = parse_translation(&body)?;
        debug!(preview = preview(&translated, 50), "translated");
        Ok(translated)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array: `[[["seg1", "src1", ...], ["seg2", ...]], ...]`.
fn parse_translation(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        StoryVoiceError::Translation(format!(
            "invalid response: {e} (got: {})",
            preview(body, 200)
        ))
    })?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| StoryVoiceError::Translation("response has no segments".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(StoryVoiceError::Translation("empty translation".into()));
    }

    Ok(translated)
}
