//! Adapter for sources that publish no feed: extracts `(url, title)` pairs
//! from raw listing-page markup. Same output contract as the feed fetcher —
//! empty batch on any failure, never an error past the boundary.

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{info, warn};

use crate::fetcher::FeedFetcher;
use crate::types::{Category, RawArticle, Result};

/// One feedless source with its extraction patterns, compiled up front.
///
/// The primary pattern captures `(href, title)` in one pass over the card
/// markup; when it yields nothing the fallback pairs standalone link and
/// heading matches by position. All extracted articles get a placeholder
/// publish time and `has_reliable_timestamp = false`.
pub struct ScrapeTarget {
    pub name: String,
    pub url: String,
    pub category: Category,
    base_url: String,
    primary: Regex,
    fallback_links: Regex,
    fallback_titles: Regex,
}

impl ScrapeTarget {
    pub fn new(
        name: &str,
        url: &str,
        category: Category,
        base_url: &str,
        primary: &str,
        fallback_links: &str,
        fallback_titles: &str,
    ) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                crate::types::DigestError::Config(format!("bad scrape pattern for {name}: {e}"))
            })
        };

        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            category,
            base_url: base_url.to_string(),
            primary: compile(primary)?,
            fallback_links: compile(fallback_links)?,
            fallback_titles: compile(fallback_titles)?,
        })
    }

    /// The article index of artificialanalysis.ai. Cards are anchor tags
    /// around an `<h2>` title; no publish dates are exposed.
    pub fn artificial_analysis() -> Self {
        Self::new(
            "Artificial Analysis",
            "https://artificialanalysis.ai/articles",
            Category::Agents,
            "https://artificialanalysis.ai",
            r#"(?is)<a[^>]*href="(/articles/[^"]+)"[^>]*>.*?<h2[^>]*>([^<]+)</h2>"#,
            r#"href="(/articles/[^"]+)""#,
            r#"(?i)<h2[^>]*>([^<]+)</h2>"#,
        )
        .expect("static scrape patterns are valid")
    }

    /// Fetch and extract. Never fails: errors become an empty batch.
    pub async fn scrape(&self, fetcher: &FeedFetcher, max_items: usize) -> Vec<RawArticle> {
        match self.try_scrape(fetcher, max_items).await {
            Ok(articles) => {
                info!("Scraped {} articles from {}", articles.len(), self.name);
                articles
            }
            Err(e) => {
                warn!("Failed to scrape {}: {}", self.name, e);
                Vec::new()
            }
        }
    }

    async fn try_scrape(&self, fetcher: &FeedFetcher, max_items: usize) -> Result<Vec<RawArticle>> {
        let html = fetcher.fetch_page(&self.url).await?;
        Ok(self.extract(&html, Utc::now(), max_items))
    }

    /// Pure extraction step, capped at `max_items` to bound worst-case volume
    /// from an unreliable pattern.
    pub fn extract(&self, html: &str, now: DateTime<Utc>, max_items: usize) -> Vec<RawArticle> {
        let mut pairs: Vec<(String, String)> = self
            .primary
            .captures_iter(html)
            .map(|cap| (cap[1].to_string(), cap[2].trim().to_string()))
            .filter(|(slug, title)| !slug.is_empty() && !title.is_empty())
            .collect();

        if pairs.is_empty() {
            let mut links: Vec<String> = Vec::new();
            for cap in self.fallback_links.captures_iter(html) {
                let link = cap[1].to_string();
                if !links.contains(&link) {
                    links.push(link);
                }
            }
            let titles: Vec<String> = self
                .fallback_titles
                .captures_iter(html)
                .map(|cap| cap[1].trim().to_string())
                .collect();

            pairs = links.into_iter().zip(titles).collect();
        }

        pairs
            .into_iter()
            .take(max_items)
            .map(|(slug, title)| RawArticle {
                title,
                url: format!("{}{}", self.base_url, slug),
                source_name: self.name.clone(),
                category: self.category,
                published_at: now,
                snippet: String::new(),
                full_text: None,
                // Listing pages expose no dates; exempt from recency filtering.
                has_reliable_timestamp: false,
            })
            .collect()
    }
}
