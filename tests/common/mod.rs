#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use feed_digest::aggregator::ArticleSource;
use feed_digest::briefing::{ArticleAnalysis, Summarizer};
use feed_digest::digest::EmailSink;
use feed_digest::store::ArticleStore;
use feed_digest::types::{
    Category, DigestError, EnrichedArticle, RawArticle, Result,
};

/// Article published `age_hours` ago with a reliable timestamp.
pub fn article(url: &str, title: &str, source: &str, category: Category, age_hours: i64) -> RawArticle {
    RawArticle {
        title: title.to_string(),
        url: url.to_string(),
        source_name: source.to_string(),
        category,
        published_at: Utc::now() - Duration::hours(age_hours),
        snippet: format!("snippet for {title}"),
        full_text: None,
        has_reliable_timestamp: true,
    }
}

/// Source that yields a fixed batch, or fails outright.
pub struct StaticSource {
    pub name: String,
    pub articles: Vec<RawArticle>,
    pub fail: bool,
}

impl StaticSource {
    pub fn ok(name: &str, articles: Vec<RawArticle>) -> Self {
        Self {
            name: name.to_string(),
            articles,
            fail: false,
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            articles: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawArticle>> {
        if self.fail {
            return Err(DigestError::General("simulated timeout".to_string()));
        }
        Ok(self.articles.clone())
    }
}

/// Scripted summarizer behaviors for the enrichment stage.
pub enum SummarizerScript {
    /// Full analysis for every article in the batch.
    Echo,
    /// Returns only the first `n` analyses per batch.
    Short(usize),
    /// Every call fails.
    Fail,
}

pub struct ScriptedSummarizer {
    script: SummarizerScript,
    pub briefing_calls: AtomicUsize,
    pub intro_calls: AtomicUsize,
}

impl ScriptedSummarizer {
    pub fn new(script: SummarizerScript) -> Self {
        Self {
            script,
            briefing_calls: AtomicUsize::new(0),
            intro_calls: AtomicUsize::new(0),
        }
    }

    fn analysis_for(article: &RawArticle) -> ArticleAnalysis {
        ArticleAnalysis {
            summary: format!("summary of {}", article.title),
            briefing: format!("briefing of {}", article.title),
            tags: vec!["test".to_string()],
            content_angles: vec!["an angle".to_string()],
        }
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn briefings(&self, batch: &[RawArticle]) -> Result<Vec<ArticleAnalysis>> {
        self.briefing_calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            SummarizerScript::Echo => Ok(batch.iter().map(Self::analysis_for).collect()),
            SummarizerScript::Short(n) => {
                Ok(batch.iter().take(*n).map(Self::analysis_for).collect())
            }
            SummarizerScript::Fail => {
                Err(DigestError::Summarizer("simulated failure".to_string()))
            }
        }
    }

    async fn digest_intro(&self, _articles: &[EnrichedArticle]) -> Result<String> {
        self.intro_calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            SummarizerScript::Fail => {
                Err(DigestError::Summarizer("simulated failure".to_string()))
            }
            _ => Ok("Today's theme is testing.".to_string()),
        }
    }
}

/// Sink that records what it was asked to send.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EmailSink for RecordingSink {
    async fn send(&self, _html: &str, _text: &str, subject: &str, recipient: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), recipient.to_string()));
        Ok(())
    }
}

/// Store whose existence checks always error, for the fail-open policy.
pub struct BrokenExistsStore;

#[async_trait]
impl ArticleStore for BrokenExistsStore {
    async fn exists(&self, _url: &str) -> Result<bool> {
        Err(DigestError::General("store unavailable".to_string()))
    }

    async fn upsert_enriched(&self, _article: &EnrichedArticle) -> Result<()> {
        Ok(())
    }

    async fn upsert_basic(&self, _article: &RawArticle) -> Result<()> {
        Ok(())
    }

    async fn count_created_since(&self, _since: DateTime<Utc>) -> Result<u32> {
        Err(DigestError::General("store unavailable".to_string()))
    }

    async fn deleted_urls(&self) -> Result<HashSet<String>> {
        Err(DigestError::General("store unavailable".to_string()))
    }
}
