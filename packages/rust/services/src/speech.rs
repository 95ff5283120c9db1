//! Text-to-speech into audio files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use storyvoice_shared::{Result, StoryVoiceError};
use tracing::{debug, instrument};
use url::Url;

/// The TTS endpoint rejects requests longer than this many characters.
const MAX_CHUNK_CHARS: usize = 100;

/// Voice selection for a synthesis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Language code of the voice.
    pub lang: String,
    /// Slow speaking rate.
    pub slow: bool,
}

/// Synthesizes speech and writes the audio bytes to `output`.
///
/// The caller is responsible for validating that the written file is
/// non-empty.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &Voice, output: &Path) -> Result<()>;
}

/// Client for the `translate_tts` web endpoint.
pub struct GoogleSpeech {
    client: Client,
    endpoint: Url,
}

impl GoogleSpeech {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let (client, base) = crate::build_client(base_url, timeout_secs)?;
        let endpoint = base.join("translate_tts").map_err(|e| {
            StoryVoiceError::config(format!("invalid speech URL '{base_url}': {e}"))
        })?;
        Ok(Self { client, endpoint })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        voice: &Voice,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let speed = if voice.slow { "0.24" } else { "1" };
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(self.endpoint.as_str())
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", voice.lang.as_str()),
                ("ttsspeed", speed),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| StoryVoiceError::Synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoryVoiceError::Synthesis(format!(
                "chunk {idx}/{total}: HTTP {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoryVoiceError::Synthesis(format!("failed to read audio: {e}")))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    #[instrument(skip_all, fields(lang = %voice.lang, output = %output.display()))]
    async fn synthesize(&self, text: &str, voice: &Voice, output: &Path) -> Result<()> {
        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(StoryVoiceError::Synthesis("nothing to synthesize".into()));
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, voice, idx, chunks.len()).await?;
            debug!(idx, size = bytes.len(), "audio chunk received");
            audio.extend_from_slice(&bytes);
        }

        write_atomic(output, &audio)
    }
}

/// Split `text` into pieces of at most `max_chars` characters, breaking at
/// whitespace where possible. Words longer than `max_chars` are cut.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        while word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map_or(word.len(), |(i, _)| i);
            chunks.push(word[..split_at].to_string());
            word = &word[split_at..];
            word_len -= max_chars;
        }

        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Write to a hidden temp file, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoryVoiceError::io(parent, e))?;
    }

    let temp = temp_path(path);
    std::fs::write(&temp, bytes).map_err(|e| StoryVoiceError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| StoryVoiceError::io(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".into());
    path.with_file_name(format!(".{name}.tmp"))
}
