use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("build http client")]
    Client(#[source] reqwest::Error),

    #[error("GET {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url}: unexpected status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// The page header did not match the expected title template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("page has no <title> element")]
    MissingTitle,

    #[error("title {header:?} does not contain {delimiter:?}")]
    MissingDelimiter {
        header: String,
        delimiter: &'static str,
    },

    #[error("title {header:?} yields an empty {field}")]
    EmptyField { header: String, field: &'static str },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Track URLs were not found!")]
pub struct TrackNotFoundError;
