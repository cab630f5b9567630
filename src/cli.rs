use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::download::{DEFAULT_SAVE_ROOT, DEFAULT_TIMEOUT_SECS, DownloadConfig};
use crate::extract::DEFAULT_TRACK_SCHEME;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Defaults to `download`, prompting for the book URL.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download every track of a book page.
    Download(DownloadArgs),
    /// Print the book metadata and track URLs as JSON without downloading.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Book page URL (must be http/https). Prompted for when omitted.
    #[arg(long)]
    pub url: Option<String>,

    /// Output root; tracks land in `<out>/<author>/<title>/`.
    #[arg(long, default_value = DEFAULT_SAVE_ROOT)]
    pub out: PathBuf,

    /// Per-request timeout.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Literal every track URL in the player script starts with.
    #[arg(long, hide = true, default_value = DEFAULT_TRACK_SCHEME)]
    pub track_scheme: String,
}

impl Default for DownloadArgs {
    fn default() -> Self {
        Self {
            url: None,
            out: PathBuf::from(DEFAULT_SAVE_ROOT),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            track_scheme: DEFAULT_TRACK_SCHEME.to_owned(),
        }
    }
}

impl DownloadArgs {
    pub fn config(&self) -> DownloadConfig {
        DownloadConfig {
            save_root: self.out.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Book page URL (must be http/https).
    #[arg(long)]
    pub url: String,

    /// Per-request timeout.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl InspectArgs {
    pub fn config(&self) -> DownloadConfig {
        DownloadConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..DownloadConfig::default()
        }
    }
}
