use std::path::PathBuf;

use clap::Parser;

use crate::config::ProviderKind;
use crate::utils::Error;

/// Env var set by Sonarr's custom script connection.
pub const SONARR_EPISODE_PATH_VAR: &str = "sonarr_episodefile_path";

#[derive(Debug, Parser)]
#[command(
    name = "subarr",
    version,
    about = "Download the closest matching subtitle for a movie or episode"
)]
pub struct Cli {
    /// Media file or folder to process
    pub path: Option<PathBuf>,

    /// Media file or folder to process (same as the positional argument)
    #[arg(short, long, conflicts_with = "path")]
    pub input: Option<PathBuf>,

    /// Read the episode path from the Sonarr environment
    #[arg(short, long)]
    pub sonarr: bool,

    /// Disable notifications
    #[arg(short, long)]
    pub quiet: bool,

    /// Override the configured subtitle provider
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Path to the TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The path to process. `sonarr_path` is the value of the Sonarr env var, if set.
    pub fn resolve_input(&self, sonarr_path: Option<String>) -> Result<PathBuf, Error> {
        if self.sonarr {
            return sonarr_path
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .ok_or_else(|| {
                    Error::Other(format!(
                        "--sonarr given but {SONARR_EPISODE_PATH_VAR} is not set"
                    ))
                });
        }

        self.input
            .clone()
            .or_else(|| self.path.clone())
            .ok_or_else(|| Error::Other("Missing input file or folder".to_string()))
    }
}
