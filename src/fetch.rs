use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::error::FetchError;
use crate::page::decode_html;

const USER_AGENT_VALUE: &str = concat!("audiobook-dl/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client shared by the page request and every track request.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Page body decoded per [`decode_html`], so a charset declared only in
    /// the markup is honoured too.
    pub fn page_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().map_err(|source| FetchError::Request {
            url: url.to_owned(),
            source,
        })?;
        Ok(decode_html(&body, content_type.as_deref()))
    }

    /// Body of `url` after redirects, unchecked for content type.
    pub fn bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url, "*/*")?;
        let bytes = response.bytes().map_err(|source| FetchError::Request {
            url: url.to_owned(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    fn get(&self, url: &str, accept: &'static str) -> Result<Response, FetchError> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, accept)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status,
            });
        }
        if response.url().as_str() != url {
            tracing::debug!(%url, final_url = %response.url(), "followed redirect");
        }
        Ok(response)
    }
}
