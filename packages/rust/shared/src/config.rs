//! Application configuration for StoryVoice.
//!
//! User config lives at `~/.storyvoice/storyvoice.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoryVoiceError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "storyvoice.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".storyvoice";

// ---------------------------------------------------------------------------
// Config structs (matching storyvoice.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Feed selection and filtering.
    #[serde(default)]
    pub acquisition: AcquisitionSection,

    /// Feed HTTP client settings.
    #[serde(default)]
    pub feeds: FeedsSection,

    /// Translation and romanization.
    #[serde(default)]
    pub transform: TransformSection,

    /// Speech synthesis.
    #[serde(default)]
    pub synthesis: SynthesisSection,

    /// Companion log file.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[acquisition]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionSection {
    /// Feeds to query, in order.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// A post is relevant if any keyword appears in its title or body.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Posts requested per feed.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,

    /// Narrative text must be longer than this many characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Stored text is truncated to this many characters.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Stories kept after ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Stage output file.
    #[serde(default = "default_acquisition_output")]
    pub output_file: String,
}

impl Default for AcquisitionSection {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            keywords: default_keywords(),
            fetch_limit: default_fetch_limit(),
            min_length: default_min_length(),
            max_length: default_max_length(),
            top_n: default_top_n(),
            output_file: default_acquisition_output(),
        }
    }
}

fn default_sources() -> Vec<String> {
    [
        "relationships",
        "AmItheAsshole",
        "relationship_advice",
        "confessions",
        "tifu",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_keywords() -> Vec<String> {
    ["drama", "betrayal", "cheating", "breakup", "affair", "divorce"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_fetch_limit() -> u32 {
    50
}
fn default_min_length() -> usize {
    100
}
fn default_max_length() -> usize {
    1000
}
fn default_top_n() -> usize {
    10
}
fn default_acquisition_output() -> String {
    "reddit_stories.json".into()
}

/// `[feeds]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsSection {
    /// Base URL of the listing API.
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,

    /// User-Agent sent with every listing request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedsSection {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_feed_base_url() -> String {
    "https://www.reddit.com".into()
}
fn default_user_agent() -> String {
    concat!("storyvoice/", env!("CARGO_PKG_VERSION")).into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[transform]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSection {
    /// Stage input (normally the acquisition output).
    #[serde(default = "default_acquisition_output")]
    pub input_file: String,

    /// Stage output file.
    #[serde(default = "default_transform_output")]
    pub output_file: String,

    /// Target language code for translation.
    #[serde(default = "default_lang")]
    pub target_lang: String,

    /// Script the translation comes back in.
    #[serde(default = "default_from_scheme")]
    pub from_scheme: String,

    /// Romanization scheme.
    #[serde(default = "default_to_scheme")]
    pub to_scheme: String,

    /// Translation attempts before falling back to the original text.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between translation attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Base URL of the translation endpoint.
    #[serde(default = "default_translate_base_url")]
    pub translate_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            input_file: default_acquisition_output(),
            output_file: default_transform_output(),
            target_lang: default_lang(),
            from_scheme: default_from_scheme(),
            to_scheme: default_to_scheme(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            translate_base_url: default_translate_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_transform_output() -> String {
    "reddit_stories_romanized.json".into()
}
fn default_lang() -> String {
    "hi".into()
}
fn default_from_scheme() -> String {
    "devanagari".into()
}
fn default_to_scheme() -> String {
    "itrans".into()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_translate_base_url() -> String {
    "https://translate.googleapis.com".into()
}

/// `[synthesis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSection {
    /// Stage input (normally the transform output).
    #[serde(default = "default_transform_output")]
    pub input_file: String,

    /// Directory receiving `story_<n>.<ext>` files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Voice language code.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Slow speaking rate.
    #[serde(default)]
    pub slow: bool,

    /// Audio file extension.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Base URL of the speech endpoint.
    #[serde(default = "default_tts_base_url")]
    pub tts_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SynthesisSection {
    fn default() -> Self {
        Self {
            input_file: default_transform_output(),
            output_dir: default_output_dir(),
            lang: default_lang(),
            slow: false,
            extension: default_extension(),
            tts_base_url: default_tts_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_output_dir() -> String {
    "audio_files".into()
}
fn default_extension() -> String {
    "mp3".into()
}
fn default_tts_base_url() -> String {
    "https://translate.google.com".into()
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Append-only companion log.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

fn default_log_file() -> String {
    "storyvoice.log".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Filtering and ranking options for the acquisition stage.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub sources: Vec<String>,
    pub keywords: Vec<String>,
    pub fetch_limit: u32,
    pub min_length: usize,
    pub max_length: usize,
    pub top_n: usize,
}

impl AcquisitionConfig {
    /// Reject a config with nothing to fetch. Options that merely filter
    /// everything out (no keywords, `top_n = 0`) are allowed and produce an
    /// empty stage result.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(StoryVoiceError::config("no feed sources configured"));
        }
        Ok(())
    }
}

impl From<&AppConfig> for AcquisitionConfig {
    fn from(config: &AppConfig) -> Self {
        let a = &config.acquisition;
        Self {
            sources: a.sources.clone(),
            keywords: a.keywords.clone(),
            fetch_limit: a.fetch_limit,
            min_length: a.min_length,
            max_length: a.max_length,
            top_n: a.top_n,
        }
    }
}

/// HTTP settings for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl From<&AppConfig> for FeedClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.feeds.base_url.clone(),
            user_agent: config.feeds.user_agent.clone(),
            timeout_secs: config.feeds.timeout_secs,
        }
    }
}

/// Options for the transform stage.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub target_lang: String,
    pub from_scheme: String,
    pub to_scheme: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl From<&AppConfig> for TransformConfig {
    fn from(config: &AppConfig) -> Self {
        let t = &config.transform;
        Self {
            target_lang: t.target_lang.clone(),
            from_scheme: t.from_scheme.clone(),
            to_scheme: t.to_scheme.clone(),
            max_attempts: t.max_attempts.max(1),
            retry_delay: Duration::from_millis(t.retry_delay_ms),
        }
    }
}

/// Options for the synthesis stage.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub output_dir: PathBuf,
    pub lang: String,
    pub slow: bool,
    pub extension: String,
}

impl SynthesisConfig {
    /// Deterministic output path for the story at 1-based `index`.
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("story_{index}.{}", self.extension))
    }
}

impl From<&AppConfig> for SynthesisConfig {
    fn from(config: &AppConfig) -> Self {
        let s = &config.synthesis;
        Self {
            output_dir: PathBuf::from(&s.output_dir),
            lang: s.lang.clone(),
            slow: s.slow,
            extension: s.extension.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.storyvoice/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StoryVoiceError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.storyvoice/storyvoice.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StoryVoiceError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| StoryVoiceError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StoryVoiceError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StoryVoiceError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StoryVoiceError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("relationship_advice"));
        assert!(toml_str.contains("retry_delay_ms"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.acquisition.top_n, 10);
        assert_eq!(parsed.transform.max_attempts, 3);
        assert_eq!(parsed.synthesis.extension, "mp3");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[acquisition]
sources = ["tifu"]
top_n = 3

[synthesis]
slow = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.acquisition.sources, vec!["tifu".to_string()]);
        assert_eq!(config.acquisition.top_n, 3);
        assert_eq!(config.acquisition.min_length, 100);
        assert_eq!(config.acquisition.keywords.len(), 6);
        assert!(config.synthesis.slow);
        assert_eq!(config.transform.target_lang, "hi");
    }

    #[test]
    fn runtime_configs_from_app_config() {
        let app = AppConfig::default();

        let acq = AcquisitionConfig::from(&app);
        assert_eq!(acq.fetch_limit, 50);
        assert_eq!(acq.max_length, 1000);
        assert!(acq.validate().is_ok());

        let transform = TransformConfig::from(&app);
        assert_eq!(transform.retry_delay, Duration::from_secs(2));
        assert_eq!(transform.to_scheme, "itrans");

        let synth = SynthesisConfig::from(&app);
        assert_eq!(
            synth.output_path(3),
            PathBuf::from("audio_files").join("story_3.mp3")
        );
    }

    #[test]
    fn zero_attempts_is_clamped() {
        let mut app = AppConfig::default();
        app.transform.max_attempts = 0;
        assert_eq!(TransformConfig::from(&app).max_attempts, 1);
    }

    #[test]
    fn acquisition_validation() {
        let mut acq = AcquisitionConfig::from(&AppConfig::default());
        acq.sources.clear();
        assert!(acq.validate().unwrap_err().to_string().contains("no feed sources"));

        let mut acq = AcquisitionConfig::from(&AppConfig::default());
        acq.max_length = acq.min_length;
        acq.keywords.clear();
        acq.top_n = 0;
        assert!(acq.validate().is_ok());
    }
}
