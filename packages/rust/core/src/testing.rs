//! Test doubles for the stage collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::DateTime;
use storyvoice_feeds::FeedSource;
use storyvoice_services::{SpeechSynthesizer, Translator, Voice};
use storyvoice_shared::{FeedPost, Result, StoryRecord, StoryVoiceError};
use storyvoice_transliterate::Transliterator;

pub(crate) fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sv-core-test-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A relevant post with a body long enough to pass the default filters.
pub(crate) fn post(id: &str, score: i64, comment_count: u64) -> FeedPost {
    FeedPost {
        id: id.into(),
        title: format!("Family drama #{id}"),
        body: "We had been planning the reunion for months when my cousin told everyone \
               what happened at the lake house last summer, and nobody spoke to me after."
            .into(),
        score,
        comment_count,
        created_at: DateTime::from_timestamp(1_709_287_200, 0).unwrap(),
    }
}

pub(crate) fn record(id: &str) -> StoryRecord {
    StoryRecord {
        id: id.into(),
        source: "relationships".into(),
        title: "My partner's secret".into(),
        text: "It started with a message I was never meant to see.".into(),
        score: 10,
        comment_count: 5,
        timestamp: "2024-03-01T10:00:00Z".into(),
        title_translated_romanized: None,
        text_translated_romanized: None,
        audio_file: None,
    }
}

pub(crate) fn romanized(id: &str, text: &str) -> StoryRecord {
    StoryRecord {
        title_translated_romanized: Some("merA sAthI".into()),
        text_translated_romanized: Some(text.into()),
        ..record(id)
    }
}

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

/// Serves canned listings; unknown sources return an empty listing.
#[derive(Default)]
pub(crate) struct StubFeed {
    listings: HashMap<String, std::result::Result<Vec<FeedPost>, String>>,
    pub(crate) requests: Mutex<Vec<(String, u32)>>,
}

impl StubFeed {
    pub(crate) fn with(mut self, source: &str, posts: Vec<FeedPost>) -> Self {
        self.listings.insert(source.into(), Ok(posts));
        self
    }

    pub(crate) fn failing(mut self, source: &str, message: &str) -> Self {
        self.listings.insert(source.into(), Err(message.into()));
        self
    }
}

#[async_trait]
impl FeedSource for StubFeed {
    async fn fetch_hot(&self, source: &str, limit: u32) -> Result<Vec<FeedPost>> {
        self.requests.lock().unwrap().push((source.into(), limit));
        match self.listings.get(source) {
            Some(Ok(posts)) => Ok(posts.clone()),
            Some(Err(message)) => Err(StoryVoiceError::Network(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Fails the first `failures` calls, then prefixes the text with `[lang]`.
pub(crate) struct ScriptedTranslator {
    failures: u32,
    pub(crate) calls: AtomicU32,
}

impl ScriptedTranslator {
    pub(crate) fn ok() -> Self {
        Self::failing_first(0)
    }

    pub(crate) fn failing_first(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(StoryVoiceError::Translation("HTTP 429 Too Many Requests".into()));
        }
        Ok(format!("[{target_lang}] {text}"))
    }
}

/// Returns the same translation for every input.
pub(crate) struct FixedTranslator(pub(crate) &'static str);

#[async_trait]
impl Translator for FixedTranslator {
    async fn translate(&self, _text: &str, _target_lang: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

// ---------------------------------------------------------------------------
// Transliteration
// ---------------------------------------------------------------------------

/// Uppercases its input, or always errors.
pub(crate) struct StubTransliterator {
    pub(crate) fail: bool,
    pub(crate) calls: AtomicU32,
}

impl StubTransliterator {
    pub(crate) fn upper() -> Self {
        Self {
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicU32::new(0),
        }
    }
}

impl Transliterator for StubTransliterator {
    fn transliterate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoryVoiceError::Transliteration(format!(
                "unsupported scheme pair {from} -> {to}"
            )));
        }
        Ok(text.to_uppercase())
    }
}

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

/// Writes `audio` to the output path. Texts in `fail_on` error instead;
/// texts in `no_file` succeed without writing anything.
#[derive(Default)]
pub(crate) struct StubSpeech {
    pub(crate) audio: Vec<u8>,
    pub(crate) fail_on: Vec<String>,
    pub(crate) no_file: Vec<String>,
    pub(crate) calls: Mutex<Vec<(String, Voice, PathBuf)>>,
}

impl StubSpeech {
    pub(crate) fn writing(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSpeech {
    async fn synthesize(&self, text: &str, voice: &Voice, output: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((text.into(), voice.clone(), output.to_path_buf()));

        if self.fail_on.iter().any(|t| t == text) {
            return Err(StoryVoiceError::Synthesis("voice unavailable".into()));
        }
        if self.no_file.iter().any(|t| t == text) {
            return Ok(());
        }
        std::fs::write(output, &self.audio).map_err(|e| StoryVoiceError::io(output, e))
    }
}
