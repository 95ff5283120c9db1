//! StoryVoice CLI: trending stories in, romanized narration out.
//!
//! Fetches engaging posts from topical feeds, translates and romanizes
//! them, and narrates each one into an audio file.

mod commands;
mod summary;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;
use storyvoice_shared::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = match commands::load_app_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // No config means no configured log file; use the default one.
            let log_file = AppConfig::default().logging.log_file;
            commands::init_tracing(&cli, &log_file);
            return Err(commands::failure(e, &log_file));
        }
    };
    let log_file = config.logging.log_file.clone();
    commands::init_tracing(&cli, &log_file);

    commands::run(cli, config)
        .await
        .map_err(|e| commands::failure(e, &log_file))
}
