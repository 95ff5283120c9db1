//! Shared types, error model, and configuration for StoryVoice.
//!
//! This crate is the foundation depended on by all other StoryVoice crates.
//! It provides:
//! - [`StoryVoiceError`]: the unified error type
//! - Domain types ([`StoryRecord`], [`FeedPost`], [`SynthesizedStory`])
//! - Configuration ([`AppConfig`], the per-stage runtime configs, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AcquisitionConfig, AcquisitionSection, AppConfig, FeedClientConfig, FeedsSection,
    LoggingSection, SynthesisConfig, SynthesisSection, TransformConfig, TransformSection,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, StoryVoiceError};
pub use types::{FeedPost, StoryRecord, SynthesizedStory, engagement_key, preview};
