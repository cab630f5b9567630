use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use scraper::{Html, Selector};

static TITLE: OnceLock<Selector> = OnceLock::new();
static SCRIPT: OnceLock<Selector> = OnceLock::new();
static META_CHARSET: OnceLock<Regex> = OnceLock::new();

fn meta_charset_pattern() -> &'static Regex {
    META_CHARSET.get_or_init(|| {
        Regex::new(r#"(?i-u)<meta\b[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
            .expect("compile meta charset pattern")
    })
}

fn title_selector() -> &'static Selector {
    TITLE.get_or_init(|| Selector::parse("title").expect("compile title selector"))
}

fn script_selector() -> &'static Selector {
    SCRIPT.get_or_init(|| Selector::parse("script").expect("compile script selector"))
}

/// Decodes a page body using the `Content-Type` charset, then the first
/// `<meta charset>` (or `http-equiv` content) in the markup, then UTF-8.
/// A byte order mark overrides all of them.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(header_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(bytes))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = used.name(), "page contains malformed byte sequences");
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Some(value.trim().trim_matches(|c: char| c == '"' || c == '\''))
    })
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let captures = meta_charset_pattern().captures(bytes)?;
    let encoding = Encoding::for_label(captures.get(1)?.as_bytes())?;
    // Markup that was readable as ASCII is not UTF-16.
    if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
        return Some(UTF_8);
    }
    Some(encoding)
}

/// A parsed book page. Only the queries the extraction rules need are exposed.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Text of the first `<title>` element, if any.
    pub fn title_text(&self) -> Option<String> {
        self.html
            .select(title_selector())
            .next()
            .map(|title| title.text().collect())
    }

    /// Bodies of all non-empty `<script>` elements in document order.
    pub fn script_bodies(&self) -> Vec<String> {
        self.html
            .select(script_selector())
            .map(|script| script.text().collect::<String>())
            .filter(|body| !body.is_empty())
            .collect()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("title", &self.title_text())
            .field("scripts", &self.script_bodies().len())
            .finish()
    }
}
