//! Fan-out stage: pulls every registered source concurrently and concatenates
//! whatever succeeded. Isolation is structural — each source resolves to its
//! own [`SourceOutcome`], so one failure can never cancel or block siblings.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use crate::config::PipelineSettings;
use crate::fetcher::FeedFetcher;
use crate::scraper::ScrapeTarget;
use crate::sources;
use crate::types::{FeedSource, RawArticle, Result};

/// Anything that can yield a batch of normalized articles. Implementations
/// are expected to swallow their own transient errors and return an empty
/// batch; the aggregator still captures an `Err` as zero records in case an
/// implementation leaks one.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> Result<Vec<RawArticle>>;
}

/// Feed-protocol source backed by the shared fetcher.
pub struct RssSource {
    source: FeedSource,
    fetcher: Arc<FeedFetcher>,
}

impl RssSource {
    pub fn new(source: FeedSource, fetcher: Arc<FeedFetcher>) -> Self {
        Self { source, fetcher }
    }
}

#[async_trait]
impl ArticleSource for RssSource {
    fn name(&self) -> &str {
        &self.source.name
    }

    async fn fetch(&self) -> Result<Vec<RawArticle>> {
        Ok(self.fetcher.fetch_source(&self.source).await)
    }
}

/// Feedless source backed by the pattern-extraction adapter.
pub struct ScrapedSource {
    target: ScrapeTarget,
    fetcher: Arc<FeedFetcher>,
    max_items: usize,
}

impl ScrapedSource {
    pub fn new(target: ScrapeTarget, fetcher: Arc<FeedFetcher>, max_items: usize) -> Self {
        Self {
            target,
            fetcher,
            max_items,
        }
    }
}

#[async_trait]
impl ArticleSource for ScrapedSource {
    fn name(&self) -> &str {
        &self.target.name
    }

    async fn fetch(&self) -> Result<Vec<RawArticle>> {
        Ok(self.target.scrape(&self.fetcher, self.max_items).await)
    }
}

/// Per-source result of one fan-out pass.
pub struct SourceOutcome {
    pub source_name: String,
    pub result: Result<Vec<RawArticle>>,
}

/// Concatenation of all successful batches plus fan-out bookkeeping.
pub struct AggregateResult {
    pub articles: Vec<RawArticle>,
    pub sources_ok: usize,
    pub sources_failed: usize,
}

pub struct Aggregator {
    sources: Vec<Arc<dyn ArticleSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn ArticleSource>>) -> Self {
        Self { sources }
    }

    /// Builds the full registry: every RSS source plus every scrape target,
    /// all sharing one fetcher (and therefore one rate limiter).
    pub fn from_registry(fetcher: Arc<FeedFetcher>, settings: &PipelineSettings) -> Self {
        let mut registered: Vec<Arc<dyn ArticleSource>> = sources::feed_sources()
            .into_iter()
            .map(|s| Arc::new(RssSource::new(s, fetcher.clone())) as Arc<dyn ArticleSource>)
            .collect();

        for target in sources::scrape_targets() {
            registered.push(Arc::new(ScrapedSource::new(
                target,
                fetcher.clone(),
                settings.scrape_max_items,
            )));
        }

        Self::new(registered)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Settle every source and keep whatever succeeded. No ordering guarantee
    /// across sources.
    pub async fn fetch_all(&self) -> AggregateResult {
        let tasks = self.sources.iter().map(|source| {
            let source = source.clone();
            async move {
                SourceOutcome {
                    source_name: source.name().to_string(),
                    result: source.fetch().await,
                }
            }
        });

        let outcomes = join_all(tasks).await;

        let mut articles = Vec::new();
        let mut sources_ok = 0;
        let mut sources_failed = 0;
        for outcome in outcomes {
            match outcome.result {
                Ok(batch) => {
                    sources_ok += 1;
                    articles.extend(batch);
                }
                Err(e) => {
                    sources_failed += 1;
                    warn!("Source {} failed: {}", outcome.source_name, e);
                }
            }
        }

        info!(
            "Aggregated {} articles from {} sources ({} failed)",
            articles.len(),
            sources_ok,
            sources_failed
        );

        AggregateResult {
            articles,
            sources_ok,
            sources_failed,
        }
    }
}
