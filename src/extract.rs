//! Full-article-body extraction for the enrich track. Failure yields `None`
//! and the pipeline continues with the RSS snippet.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use crate::fetcher::FeedFetcher;

/// Keeps extracted bodies from blowing up summarizer prompts.
const MAX_FULL_TEXT_CHARS: usize = 10_000;

#[async_trait]
pub trait FullTextExtractor: Send + Sync {
    /// Best-effort body text for one article URL. `None` on any failure.
    async fn extract(&self, url: &str) -> Option<String>;
}

/// Fetches the article page and pulls readable text out of the markup,
/// preferring the `<article>` element, then `<main>`, then all paragraphs.
pub struct HttpTextExtractor {
    fetcher: Arc<FeedFetcher>,
}

impl HttpTextExtractor {
    pub fn new(fetcher: Arc<FeedFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl FullTextExtractor for HttpTextExtractor {
    async fn extract(&self, url: &str) -> Option<String> {
        let html = match self.fetcher.fetch_page(url).await {
            Ok(body) => body,
            Err(e) => {
                debug!("Full-text fetch failed for {}: {}", url, e);
                return None;
            }
        };

        let text = html_to_text(&html);
        if text.is_none() {
            debug!("No readable body found at {}", url);
        }
        text
    }
}

/// Synchronous DOM walk, kept out of the async path so the parsed document
/// never lives across an await point.
pub fn html_to_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let article = Selector::parse("article").expect("valid selector");
    let main = Selector::parse("main").expect("valid selector");
    let paragraph = Selector::parse("p").expect("valid selector");

    let paragraphs: Vec<String> = if let Some(scope) = document.select(&article).next() {
        scope
            .select(&paragraph)
            .map(|p| p.text().collect::<String>())
            .collect()
    } else if let Some(scope) = document.select(&main).next() {
        scope
            .select(&paragraph)
            .map(|p| p.text().collect::<String>())
            .collect()
    } else {
        document
            .select(&paragraph)
            .map(|p| p.text().collect::<String>())
            .collect()
    };

    let body = paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if body.is_empty() {
        return None;
    }

    Some(body.chars().take(MAX_FULL_TEXT_CHARS).collect())
}
