use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topic category, fixed at the source level. Every article inherits the
/// category of the source it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Agents,
    Ai,
    Seo,
    Tech,
    Marketing,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Agents => "agents",
            Category::Ai => "ai",
            Category::Seo => "seo",
            Category::Tech => "tech",
            Category::Marketing => "marketing",
        }
    }

    /// Human label used in the digest email.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Agents => "AI Agents",
            Category::Ai => "AI & ML",
            Category::Seo => "SEO & Search",
            Category::Tech => "Tech News",
            Category::Marketing => "Marketing",
        }
    }

    pub fn from_str_lossy(s: &str) -> Category {
        match s {
            "agents" => Category::Agents,
            "ai" => Category::Ai,
            "seo" => Category::Seo,
            "marketing" => Category::Marketing,
            _ => Category::Tech,
        }
    }
}

/// One configured feed endpoint in the source registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub category: Category,
}

impl FeedSource {
    pub fn new(name: &str, url: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category,
        }
    }
}

/// One normalized article flowing through the pipeline.
///
/// `url` is the identity key: unique within a batch after deduplication and
/// the upsert-conflict key in the store. Created fresh every run; enrichment
/// derives an [`EnrichedArticle`] instead of mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub category: Category,
    pub published_at: DateTime<Utc>,
    pub snippet: String,
    pub full_text: Option<String>,
    /// False when `published_at` is a placeholder (source gave no date).
    /// Such articles bypass the recency filter.
    pub has_reliable_timestamp: bool,
}

/// Article plus its derived priority score. Recomputed each run, never stored.
#[derive(Debug, Clone)]
pub struct ScoredArticle {
    pub article: RawArticle,
    pub score: i64,
}

/// Article with generated briefing fields attached.
///
/// Enrichment fields are empty strings / empty vecs on summarizer failure,
/// never absent, so downstream consumers don't branch on `Option`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub article: RawArticle,
    pub summary: String,
    pub briefing: String,
    pub tags: Vec<String>,
    pub content_angles: Vec<String>,
}

impl EnrichedArticle {
    /// Degraded enrichment: the article survives with empty analysis fields.
    pub fn without_analysis(article: RawArticle) -> Self {
        Self {
            article,
            summary: String::new(),
            briefing: String::new(),
            tags: Vec::new(),
            content_angles: Vec::new(),
        }
    }
}

/// Enrichment budget bookkeeping surfaced in the run report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyUsage {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

/// Outcome of a single orchestrated run. Always carries the full stage log,
/// whether the run finished clean, degraded, or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub success: bool,
    pub total_new: usize,
    pub ai_processed: usize,
    pub saved_without_ai: usize,
    pub daily_usage: DailyUsage,
    pub duration_ms: u64,
    pub log: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, DigestError>;
