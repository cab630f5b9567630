use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::extract::{DefaultSite, SiteRules};
use crate::fetch::Fetcher;
use crate::formats::{BookListing, BookMetadata};
use crate::page::Document;

pub const DEFAULT_SAVE_ROOT: &str = "./outputs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub save_root: PathBuf,
    pub timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            save_root: PathBuf::from(DEFAULT_SAVE_ROOT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Emitted after a track file has been written.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub index: usize,
    pub total: usize,
    pub path: &'a Path,
}

impl Progress<'_> {
    pub fn percent(&self) -> f64 {
        (self.index * 100) as f64 / self.total as f64
    }
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Progress: {:6.2}%", self.percent())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DownloadEvent<'a> {
    /// Metadata is known; the track list has not been looked up yet.
    Started { metadata: &'a BookMetadata },
    TrackSaved(Progress<'a>),
}

/// Console lines for the user: one announcement, then one line per track.
pub fn write_event(mut out: impl Write, event: &DownloadEvent<'_>) -> io::Result<()> {
    match event {
        DownloadEvent::Started { metadata } => {
            writeln!(out, "Downloading: {} - \"{}\"", metadata.author, metadata.title)
        }
        DownloadEvent::TrackSaved(progress) => writeln!(out, "{progress}"),
    }
}

#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub metadata: BookMetadata,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

pub fn book_dir(save_root: &Path, metadata: &BookMetadata) -> PathBuf {
    save_root.join(&metadata.author).join(&metadata.title)
}

pub fn track_file_name(index: usize) -> String {
    format!("{index:03}.mp3")
}

pub fn run(
    url: &str,
    config: &DownloadConfig,
    on_event: impl FnMut(DownloadEvent<'_>),
) -> anyhow::Result<DownloadReport> {
    run_with(&DefaultSite::default(), url, config, on_event)
}

/// Fetches the book page, extracts metadata and tracks with `rules`, then
/// writes every track to `<save_root>/<author>/<title>/NNN.mp3` in order.
///
/// The first failure aborts the run. Tracks written before it stay on disk.
pub fn run_with(
    rules: &dyn SiteRules,
    url: &str,
    config: &DownloadConfig,
    mut on_event: impl FnMut(DownloadEvent<'_>),
) -> anyhow::Result<DownloadReport> {
    let fetcher = Fetcher::new(config.timeout).context("create fetcher")?;
    let document = fetch_document(&fetcher, url)?;

    let metadata = rules.metadata(&document).context("extract book metadata")?;
    on_event(DownloadEvent::Started { metadata: &metadata });
    let tracks = rules.track_urls(&document).context("extract track urls")?;

    let dir = book_dir(&config.save_root, &metadata);
    let total = tracks.len();
    tracing::info!(
        author = %metadata.author,
        title = %metadata.title,
        tracks = total,
        dir = %dir.display(),
        "downloading book"
    );

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create book dir: {}", dir.display()))?;

    let mut files = Vec::with_capacity(total);
    for (offset, track_url) in tracks.iter().enumerate() {
        let index = offset + 1;
        let bytes = fetcher
            .bytes(track_url)
            .with_context(|| format!("download track {index}/{total}"))?;

        let path = dir.join(track_file_name(index));
        std::fs::write(&path, &bytes)
            .with_context(|| format!("write track: {}", path.display()))?;
        tracing::debug!(index, total, bytes = bytes.len(), path = %path.display(), "saved track");

        on_event(DownloadEvent::TrackSaved(Progress {
            index,
            total,
            path: &path,
        }));
        files.push(path);
    }

    Ok(DownloadReport {
        metadata,
        dir,
        files,
    })
}

pub fn inspect(url: &str, config: &DownloadConfig) -> anyhow::Result<BookListing> {
    inspect_with(&DefaultSite::default(), url, config)
}

/// Same extraction as [`run_with`] without touching the filesystem.
pub fn inspect_with(
    rules: &dyn SiteRules,
    url: &str,
    config: &DownloadConfig,
) -> anyhow::Result<BookListing> {
    let fetcher = Fetcher::new(config.timeout).context("create fetcher")?;
    let document = fetch_document(&fetcher, url)?;
    let metadata = rules.metadata(&document).context("extract book metadata")?;
    let tracks = rules.track_urls(&document).context("extract track urls")?;
    Ok(BookListing::new(url, metadata, tracks))
}

fn fetch_document(fetcher: &Fetcher, url: &str) -> anyhow::Result<Document> {
    let html = fetcher.page_text(url).context("fetch book page")?;
    tracing::info!(%url, bytes = html.len(), "fetched book page");
    Ok(Document::parse(&html))
}
