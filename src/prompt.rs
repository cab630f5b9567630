use std::io::{BufRead, Write};

use anyhow::Context as _;
use url::Url;

pub const URL_PROMPT: &str = "Enter URL for book to be downloaded: ";

/// Asks for the book URL on `output` and reads one line from `input`.
pub fn read_url(mut input: impl BufRead, mut output: impl Write) -> anyhow::Result<String> {
    output
        .write_all(URL_PROMPT.as_bytes())
        .context("write url prompt")?;
    output.flush().context("flush url prompt")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("read url from stdin")?;
    if read == 0 {
        anyhow::bail!("no url entered (stdin closed)");
    }
    Ok(line.trim().to_owned())
}

/// Accepts only absolute http/https URLs.
pub fn validate_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("parse url: {raw:?}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("url must be http/https: {url}");
    }
    Ok(url)
}
