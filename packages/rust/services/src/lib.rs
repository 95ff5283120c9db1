//! Remote translation and speech services.
//!
//! This crate provides:
//! - [`Translator`] and [`GoogleTranslator`]: text translation
//! - [`SpeechSynthesizer`] and [`GoogleSpeech`]: text-to-speech into audio files
//!
//! Both clients talk to the public Google Translate web endpoints. Base URLs
//! are configurable so tests can point them at a mock server.

pub mod speech;
pub mod translate;

pub use speech::{GoogleSpeech, SpeechSynthesizer, Voice, split_chunks};
pub use translate::{GoogleTranslator, Translator};

use std::time::Duration;

use reqwest::Client;
use storyvoice_shared::{Result, StoryVoiceError};
use url::Url;

/// User-Agent string for service requests.
const USER_AGENT: &str = concat!("StoryVoice/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client and parse the base URL shared by both services.
fn build_client(base_url: &str, timeout_secs: u64) -> Result<(Client, Url)> {
    let base = Url::parse(base_url)
        .map_err(|e| StoryVoiceError::config(format!("invalid service URL '{base_url}': {e}")))?;

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| StoryVoiceError::Network(format!("failed to build HTTP client: {e}")))?;

    Ok((client, base))
}
