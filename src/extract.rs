//! Page-specific extraction rules: book metadata from the `<title>` header and
//! track URLs mined from inline script bodies.
//!
//! Both rules sit behind traits so a different page layout can plug in its
//! own rule without touching the download pipeline.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ParseError, TrackNotFoundError};
use crate::formats::BookMetadata;
use crate::page::Document;

pub const DEFAULT_TRACK_SCHEME: &str = "https:";

const SCRIPT_MARKER: &str = "mp3";
const PLACEHOLDER_SUFFIX: &str = "/0.mp3";

static HTTPS_TRACK: OnceLock<Regex> = OnceLock::new();

fn https_track_pattern() -> &'static Regex {
    HTTPS_TRACK.get_or_init(|| Regex::new(r"https:.*?mp3").expect("compile track pattern"))
}

/// Given raw header text, produce the book metadata or fail.
pub trait MetadataRule {
    fn parse_header(&self, header: &str) -> Result<BookMetadata, ParseError>;
}

/// Matches headers shaped like `<title> (<suffix>) - автор <author>`.
#[derive(Debug, Clone)]
pub struct TitleTemplate {
    pub title_end: &'static str,
    pub author_start: &'static str,
}

impl Default for TitleTemplate {
    fn default() -> Self {
        Self {
            title_end: " (",
            author_start: "автор ",
        }
    }
}

impl MetadataRule for TitleTemplate {
    fn parse_header(&self, header: &str) -> Result<BookMetadata, ParseError> {
        // Colons are not allowed in folder names on some platforms.
        let header = header.replace(':', "_");

        let Some((title, _)) = header.split_once(self.title_end) else {
            return Err(ParseError::MissingDelimiter {
                header,
                delimiter: self.title_end,
            });
        };
        let Some((_, author)) = header.split_once(self.author_start) else {
            return Err(ParseError::MissingDelimiter {
                header,
                delimiter: self.author_start,
            });
        };

        if title.is_empty() {
            return Err(ParseError::EmptyField {
                header,
                field: "title",
            });
        }
        if author.is_empty() {
            return Err(ParseError::EmptyField {
                header,
                field: "author",
            });
        }

        Ok(BookMetadata {
            title: title.to_owned(),
            author: author.to_owned(),
        })
    }
}

pub trait TrackRule {
    /// Picks the script body that carries the track list.
    fn select_script<'a>(&self, scripts: &'a [String]) -> Option<&'a str>;

    /// Returns plain track URLs in order of appearance, placeholders removed.
    fn mine_urls(&self, script: &str) -> Vec<String>;

    fn track_urls(&self, scripts: &[String]) -> Result<Vec<String>, TrackNotFoundError> {
        let script = self.select_script(scripts).ok_or(TrackNotFoundError)?;
        let urls = self.mine_urls(script);
        if urls.is_empty() {
            return Err(TrackNotFoundError);
        }
        Ok(urls)
    }
}

/// Mines `<scheme>...mp3` tokens out of the last script mentioning `mp3`.
#[derive(Debug, Clone)]
pub struct ScriptTrackRule {
    pattern: Regex,
}

impl ScriptTrackRule {
    /// `scheme_prefix` is the literal every track URL starts with, e.g. `https:`.
    pub fn new(scheme_prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("{}.*?mp3", regex::escape(scheme_prefix)))?;
        Ok(Self { pattern })
    }
}

impl Default for ScriptTrackRule {
    fn default() -> Self {
        Self {
            pattern: https_track_pattern().clone(),
        }
    }
}

impl TrackRule for ScriptTrackRule {
    fn select_script<'a>(&self, scripts: &'a [String]) -> Option<&'a str> {
        // Last match wins; the player config comes after any other script
        // that happens to mention mp3.
        scripts
            .iter()
            .rev()
            .find(|script| script.contains(SCRIPT_MARKER))
            .map(String::as_str)
    }

    fn mine_urls(&self, script: &str) -> Vec<String> {
        self.pattern
            .find_iter(script)
            .map(|found| found.as_str().replace('\\', ""))
            .filter(|url| !url.ends_with(PLACEHOLDER_SUFFIX))
            .collect()
    }
}

/// Everything the download pipeline needs to know about one site layout.
pub trait SiteRules {
    fn metadata(&self, document: &Document) -> Result<BookMetadata, ParseError>;
    fn track_urls(&self, document: &Document) -> Result<Vec<String>, TrackNotFoundError>;
}

#[derive(Debug, Clone, Default)]
pub struct Site<M = TitleTemplate, T = ScriptTrackRule> {
    pub metadata: M,
    pub tracks: T,
}

pub type DefaultSite = Site<TitleTemplate, ScriptTrackRule>;

impl<M: MetadataRule, T: TrackRule> SiteRules for Site<M, T> {
    fn metadata(&self, document: &Document) -> Result<BookMetadata, ParseError> {
        let header = document.title_text().ok_or(ParseError::MissingTitle)?;
        self.metadata.parse_header(&header)
    }

    fn track_urls(&self, document: &Document) -> Result<Vec<String>, TrackNotFoundError> {
        self.tracks.track_urls(&document.script_bodies())
    }
}

pub fn extract_metadata(document: &Document) -> Result<BookMetadata, ParseError> {
    DefaultSite::default().metadata(document)
}

pub fn extract_track_urls(document: &Document) -> Result<Vec<String>, TrackNotFoundError> {
    DefaultSite::default().track_urls(document)
}
