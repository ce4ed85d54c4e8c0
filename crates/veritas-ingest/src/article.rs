//! Fetching a news page and pulling out its article text.

use std::{sync::LazyLock, time::Duration};

use reqwest::{Client, Response, header::CONTENT_TYPE};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

const USER_AGENT: &str = concat!("veritas/", env!("CARGO_PKG_VERSION"));

/// Column width used when rendering a page body without paragraphs.
const FALLBACK_WIDTH: usize = 100;

/// Largest page body read before giving up.
pub const DEFAULT_MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

/// Media types treated as web pages.
const HTML_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

fn selector(css: &str) -> Selector {
  Selector::parse(css).expect("static selector is valid")
}

static OG_TITLE: LazyLock<Selector> =
  LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

/// Paragraph containers tried in order; the first that yields text wins.
static PARAGRAPHS: LazyLock<[Selector; 3]> =
  LazyLock::new(|| [selector("article p"), selector("main p"), selector("p")]);

/// The readable part of a web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
  pub url:   String,
  pub title: Option<String>,
  pub text:  String,
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

/// Downloads pages and extracts their article text.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ArticleFetcher {
  client:    Client,
  max_bytes: usize,
}

impl ArticleFetcher {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(USER_AGENT)
      .build()?;
    Ok(Self { client, max_bytes: DEFAULT_MAX_PAGE_BYTES })
  }

  /// Refuse page bodies larger than `max_bytes`.
  pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
    self.max_bytes = max_bytes;
    self
  }

  /// GET `raw_url` and extract its article.
  pub async fn fetch(&self, raw_url: &str) -> Result<Article> {
    let url = parse_url(raw_url)?;
    tracing::debug!(%url, "fetching article");

    let resp = self.client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(Error::HttpStatus {
        status: status.as_u16(),
        url:    url.to_string(),
      });
    }
    ensure_html(&resp)?;

    let html = read_capped(resp, self.max_bytes).await?;
    let (title, text) = extract_article(&html)?;
    tracing::debug!(%url, chars = text.chars().count(), "article extracted");

    Ok(Article { url: url.to_string(), title, text })
  }
}

/// A missing `Content-Type` is let through; a present one must name HTML.
fn ensure_html(resp: &Response) -> Result<()> {
  let Some(value) = resp.headers().get(CONTENT_TYPE) else {
    return Ok(());
  };
  let mime = value
    .to_str()
    .unwrap_or_default()
    .split(';')
    .next()
    .unwrap_or_default()
    .trim()
    .to_ascii_lowercase();
  if HTML_TYPES.contains(&mime.as_str()) {
    Ok(())
  } else {
    Err(Error::NotHtml(mime))
  }
}

/// Read the body chunk by chunk, stopping as soon as it passes `limit`.
async fn read_capped(mut resp: Response, limit: usize) -> Result<String> {
  if resp.content_length().is_some_and(|len| len > limit as u64) {
    return Err(Error::PageTooLarge { limit });
  }
  let mut body = Vec::new();
  while let Some(chunk) = resp.chunk().await? {
    if body.len() + chunk.len() > limit {
      return Err(Error::PageTooLarge { limit });
    }
    body.extend_from_slice(&chunk);
  }
  Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Parse and validate a user-supplied URL. Only http(s) is accepted.
pub fn parse_url(raw: &str) -> Result<Url> {
  let url = Url::parse(raw.trim())?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    other => Err(Error::UnsupportedScheme(other.to_string())),
  }
}

// ─── Extraction ──────────────────────────────────────────────────────────────

fn normalize(s: &str) -> String { s.split_whitespace().collect::<Vec<_>>().join(" ") }

fn element_text(el: ElementRef<'_>) -> String { normalize(&el.text().collect::<String>()) }

fn page_title(doc: &Html) -> Option<String> {
  let og = doc
    .select(&OG_TITLE)
    .next()
    .and_then(|el| el.value().attr("content"))
    .map(normalize);

  og.or_else(|| doc.select(&H1).next().map(element_text))
    .or_else(|| doc.select(&TITLE).next().map(element_text))
    .filter(|t| !t.is_empty())
}

/// Pull `(title, body text)` out of an HTML document.
///
/// Body text is the paragraphs of `<article>`, else `<main>`, else the whole
/// page; a page without paragraphs falls back to a plain-text rendering of
/// `<body>`.
pub fn extract_article(html: &str) -> Result<(Option<String>, String)> {
  let doc = Html::parse_document(html);
  let title = page_title(&doc);

  for sel in PARAGRAPHS.iter() {
    let paragraphs: Vec<String> = doc
      .select(sel)
      .map(element_text)
      .filter(|p| !p.is_empty())
      .collect();
    if !paragraphs.is_empty() {
      return Ok((title, paragraphs.join("\n\n")));
    }
  }

  let body_html = doc
    .select(&BODY)
    .next()
    .map(|el| el.html())
    .unwrap_or_else(|| html.to_string());
  let text = html2text::from_read(body_html.as_bytes(), FALLBACK_WIDTH)
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>()
    .join("\n");

  if text.is_empty() {
    return Err(Error::NoArticleText);
  }
  Ok((title, text))
}
