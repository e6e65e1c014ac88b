use std::collections::HashMap;
use std::time::{Duration, Instant};

use backoff::backoff::Backoff;
use backoff::exponential::ExponentialBackoff;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::config::PipelineSettings;
use crate::types::{DigestError, FeedSource, RawArticle, Result};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; FeedDigest/1.0)";

/// Minimum spacing between requests to the same host. Owned by the fetcher and
/// passed around explicitly rather than living in module scope.
pub struct HostRateLimiter {
    last_request: Mutex<HashMap<String, Instant>>,
    min_interval: Duration,
}

impl HostRateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            min_interval,
        }
    }

    /// Sleeps until the host is allowed another request, then records it.
    pub async fn wait(&self, url: &str) {
        let host = match Url::parse(url) {
            Ok(parsed) => parsed.host_str().unwrap_or("").to_string(),
            Err(_) => return,
        };

        let mut last = self.last_request.lock().await;
        if let Some(prev) = last.get(&host) {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Rate limiting {}: waiting {:?}", host, wait);
                tokio::time::sleep(wait).await;
            }
        }
        last.insert(host, Instant::now());
    }
}

/// Retrieves and parses one feed source into normalized articles.
///
/// Failure contract: a malformed feed, timeout, or network error yields an
/// empty list and a log line. Errors never cross this boundary, so one bad
/// source cannot abort its siblings.
pub struct FeedFetcher {
    client: Client,
    rate_limiter: HostRateLimiter,
    max_retries: u32,
    retry_delay: Duration,
}

impl FeedFetcher {
    pub fn new(settings: &PipelineSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(DigestError::Http)?;

        Ok(Self {
            client,
            rate_limiter: HostRateLimiter::new(Duration::from_millis(settings.scrape_delay_ms)),
            max_retries: 2,
            retry_delay: Duration::from_secs(2),
        })
    }

    /// Fetch one source. Never fails: any error is logged and turned into an
    /// empty batch.
    pub async fn fetch_source(&self, source: &FeedSource) -> Vec<RawArticle> {
        match self.try_fetch_source(source).await {
            Ok(articles) => {
                debug!("Fetched {} articles from {}", articles.len(), source.name);
                articles
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", source.name, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_source(&self, source: &FeedSource) -> Result<Vec<RawArticle>> {
        let body = self.fetch_page(&source.url).await?;
        parse_feed(&body, source, Utc::now())
    }

    /// GET a page body with per-host rate limiting and bounded retries.
    /// Shared by the feed path, the scrape adapter, and full-text extraction.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        self.rate_limiter.wait(url).await;

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: self.retry_delay,
            initial_interval: self.retry_delay,
            max_interval: self.retry_delay * 8,
            multiplier: 2.0,
            max_elapsed_time: Some(self.retry_delay * 16),
            ..Default::default()
        };

        let mut last_error: Option<DigestError> = None;
        for attempt in 0..=self.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.text().await?);
                    }
                    last_error = Some(DigestError::General(format!(
                        "HTTP {}: {}",
                        status,
                        status.canonical_reason().unwrap_or("Unknown")
                    )));
                    // Client errors won't heal on retry.
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => last_error = Some(DigestError::Http(e)),
            }

            if attempt < self.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    debug!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DigestError::General("Unknown fetch error".to_string())))
    }
}

/// Parse a feed body into normalized articles.
///
/// Title and URL are taken verbatim from the feed; a missing title falls back
/// to a placeholder and a missing publish date falls back to `now` with
/// `has_reliable_timestamp = false`.
pub fn parse_feed(
    content: &str,
    source: &FeedSource,
    now: DateTime<Utc>,
) -> Result<Vec<RawArticle>> {
    let feed = parser::parse(content.as_bytes())
        .map_err(|e| DigestError::Parse(format!("{}: {}", source.name, e)))?;

    let articles = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            // An entry without a link has no identity key; skip it.
            let url = entry.links.first()?.href.clone();

            let title = entry
                .title
                .map(|t| t.content)
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string());

            let snippet = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            let (published_at, has_reliable_timestamp) = match entry.published {
                Some(dt) => (dt.with_timezone(&Utc), true),
                None => (now, false),
            };

            Some(RawArticle {
                title,
                url,
                source_name: source.name.clone(),
                category: source.category,
                published_at,
                snippet,
                full_text: None,
                has_reliable_timestamp,
            })
        })
        .collect();

    Ok(articles)
}
