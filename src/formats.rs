use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
}

/// What `inspect` reports about a book page without downloading anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListing {
    pub url: String,
    pub title: String,
    pub author: String,
    pub tracks: Vec<String>,
}

impl BookListing {
    pub fn new(url: &str, metadata: BookMetadata, tracks: Vec<String>) -> Self {
        Self {
            url: url.to_owned(),
            title: metadata.title,
            author: metadata.author,
            tracks,
        }
    }
}
