use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

mod app;
mod cli;
mod config;
mod core;
mod utils;

use crate::app::matcher::SubtitleMatcher;
use crate::core::notify::{LogNotifier, NotificationIcon, Notifier};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = cli::Cli::parse();

    let (config, config_error) = match config::Config::init_or_default(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to initialize configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = app::common::init_logging(&config) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    if let Some(e) = config_error {
        tracing::warn!("Configuration file corrupted ({e}). Using default.");
    }
    if let Err(e) = app::common::ensure_cache_dir(&config) {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let kind = args.provider.unwrap_or(config.provider.kind);
    let catalog = match core::provider::from_config(&config, kind) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Provider configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let notifier = LogNotifier::new(
        catalog.name(),
        args.quiet,
        config.logs.file.as_ref().map(PathBuf::from),
    );

    let input = match args.resolve_input(std::env::var(cli::SONARR_EPISODE_PATH_VAR).ok()) {
        Ok(input) => input,
        Err(e) => {
            tracing::error!("{e}");
            notifier.notify(&e.to_string(), NotificationIcon::Failed, true);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        target: "subarr",
        provider = %catalog.name(),
        input = %input.display(),
        "Starting"
    );

    let mut matcher = SubtitleMatcher::new(catalog.as_ref(), &notifier, &config.media);
    let delay = Duration::from_millis(config.provider.request_delay_ms);
    match app::batch::run(&mut matcher, &input, &config.media, delay).await {
        Ok(summary) => {
            app::batch::report_summary(&summary, &notifier);
            if summary.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!("{e}");
            notifier.notify(&e.to_string(), NotificationIcon::Failed, true);
            ExitCode::FAILURE
        }
    }
}
