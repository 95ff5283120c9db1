//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result};
use storyvoice_core::{Collaborators, PipelineConfig, acquisition, synthesis, transform};
use storyvoice_feeds::RedditFeed;
use storyvoice_services::{GoogleSpeech, GoogleTranslator};
use storyvoice_shared::{
    AcquisitionConfig, AppConfig, FeedClientConfig, SynthesisConfig, TransformConfig,
    init_config, load_config, load_config_from,
};
use storyvoice_transliterate::SchemeTransliterator;
use tracing::info;

use crate::summary::{self, CliProgress};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// StoryVoice: turn trending feed stories into narrated audio.
#[derive(Parser)]
#[command(
    name = "storyvoice",
    version,
    about = "Fetch engaging stories, translate and romanize them, and narrate them to audio.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.storyvoice/storyvoice.toml.
    #[arg(long, global = true, env = "STORYVOICE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch, filter and rank stories into the acquisition file.
    Acquire {
        /// Output file (defaults to acquisition.output_file).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Number of stories to keep.
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Translate and romanize the acquired stories.
    Transform {
        /// Input file (defaults to transform.input_file).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to transform.output_file).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Narrate the romanized stories into audio files.
    Synthesize {
        /// Input file (defaults to synthesis.input_file).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Audio directory (defaults to synthesis.output_dir).
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Run all three stages in order.
    Run,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Config + tracing setup
// ---------------------------------------------------------------------------

/// Load `--config` if given, otherwise the user config (or defaults).
pub(crate) fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Initialize tracing: stderr in the chosen format plus the companion log file.
pub(crate) fn init_tracing(cli: &Cli, log_file: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = match cli.verbose {
        0 => "storyvoice=info",
        1 => "storyvoice=debug",
        _ => "storyvoice=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let stderr_layer = match cli.log_format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    let file_layer = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(file)),
        ),
        Err(e) => {
            eprintln!("warning: cannot open log file {log_file}: {e}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// Log a top-level failure once and point the user at the log file.
pub(crate) fn failure(error: Report, log_file: &str) -> Report {
    tracing::error!(error = %error, "command failed");
    error.wrap_err(format!("storyvoice failed; see {log_file} for details"))
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Command::Acquire { out, top_n } => cmd_acquire(&config, out, top_n).await,
        Command::Transform { input, out } => cmd_transform(&config, input, out).await,
        Command::Synthesize { input, out_dir } => cmd_synthesize(&config, input, out_dir).await,
        Command::Run => cmd_run(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn translator(config: &AppConfig) -> Result<GoogleTranslator> {
    Ok(GoogleTranslator::new(
        &config.transform.translate_base_url,
        config.transform.timeout_secs,
    )?)
}

fn speech(config: &AppConfig) -> Result<GoogleSpeech> {
    Ok(GoogleSpeech::new(
        &config.synthesis.tts_base_url,
        config.synthesis.timeout_secs,
    )?)
}

async fn cmd_acquire(config: &AppConfig, out: Option<PathBuf>, top_n: Option<usize>) -> Result<()> {
    let mut acquisition_config = AcquisitionConfig::from(config);
    if let Some(top_n) = top_n {
        acquisition_config.top_n = top_n;
    }
    let output = out.unwrap_or_else(|| PathBuf::from(&config.acquisition.output_file));
    let feed = RedditFeed::new(&FeedClientConfig::from(config))?;

    info!(sources = ?acquisition_config.sources, output = %output.display(), "acquiring stories");

    let progress = CliProgress::new();
    let result = acquisition::run(&feed, &acquisition_config, &output, &progress).await?;
    progress.finish();

    summary::print_stage(&result.report);
    summary::print_acquired(&result.records);
    Ok(())
}

async fn cmd_transform(
    config: &AppConfig,
    input: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let input = input.unwrap_or_else(|| PathBuf::from(&config.transform.input_file));
    let output = out.unwrap_or_else(|| PathBuf::from(&config.transform.output_file));
    let translator = translator(config)?;

    info!(input = %input.display(), output = %output.display(), "transforming stories");

    let progress = CliProgress::new();
    let result = transform::run(
        &input,
        &output,
        &translator,
        &SchemeTransliterator,
        &TransformConfig::from(config),
        &progress,
    )
    .await?;
    progress.finish();

    summary::print_stage(&result.report);
    summary::print_romanized(&result.records);
    Ok(())
}

async fn cmd_synthesize(
    config: &AppConfig,
    input: Option<PathBuf>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let input = input.unwrap_or_else(|| PathBuf::from(&config.synthesis.input_file));
    let mut synthesis_config = SynthesisConfig::from(config);
    if let Some(dir) = out_dir {
        synthesis_config.output_dir = dir;
    }
    let speech = speech(config)?;

    info!(
        input = %input.display(),
        output_dir = %synthesis_config.output_dir.display(),
        "synthesizing stories"
    );

    let progress = CliProgress::new();
    let result = synthesis::run(&input, &speech, &synthesis_config, &progress).await?;
    progress.finish();

    summary::print_stage(&result.report);
    summary::print_narrated(&result.records);
    Ok(())
}

async fn cmd_run(config: &AppConfig) -> Result<()> {
    let pipeline_config = PipelineConfig::from(config);
    pipeline_config.acquisition.validate()?;

    let feed = RedditFeed::new(&FeedClientConfig::from(config))?;
    let translator = translator(config)?;
    let speech = speech(config)?;
    let collaborators = Collaborators {
        feed: &feed,
        translator: &translator,
        transliterator: &SchemeTransliterator,
        speech: &speech,
    };

    info!("running full pipeline");

    let progress = CliProgress::new();
    let report = storyvoice_core::run_pipeline(&pipeline_config, collaborators, &progress).await?;
    progress.finish();

    for stage in &report.stages {
        summary::print_stage(stage);
    }
    if !report.completed() {
        println!();
        println!("  Stopped early: no stories to pass on to the next stage.");
    }
    summary::print_narrated(&report.stories);
    println!("  Total time: {:.1}s", report.elapsed.as_secs_f64());
    println!();
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
