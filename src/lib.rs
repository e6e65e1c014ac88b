pub mod aggregator;
pub mod api;
pub mod briefing;
pub mod budget;
pub mod config;
pub mod digest;
pub mod extract;
pub mod fetcher;
pub mod pipeline;
pub mod processing;
pub mod scoring;
pub mod scraper;
pub mod sources;
pub mod store;
pub mod types;

pub use aggregator::{Aggregator, ArticleSource, RssSource, ScrapedSource};
pub use briefing::{OpenAiSummarizer, Summarizer};
pub use config::{DigestConfig, PipelineSettings};
pub use digest::{EmailSink, SmtpSink};
pub use extract::{FullTextExtractor, HttpTextExtractor};
pub use fetcher::FeedFetcher;
pub use pipeline::Pipeline;
pub use scraper::ScrapeTarget;
pub use store::{ArticleStore, MemoryStore, PgArticleStore};
pub use types::*;
