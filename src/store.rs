//! Persistence boundary. The pipeline only ever talks to [`ArticleStore`]:
//! existence checks, conflict-ignoring upserts, a daily counter for budget
//! accounting, and the soft-delete exclusion list.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, Row};
use tracing::info;

use crate::types::{EnrichedArticle, RawArticle, Result};

/// Basic-track saves keep this much snippet as a stand-in summary.
const BASIC_SUMMARY_MAX_CHARS: usize = 500;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn exists(&self, url: &str) -> Result<bool>;
    /// Upsert keyed by `url`, ignoring conflicts. Idempotent, so concurrent
    /// runs are safe to the extent each row's upsert is atomic.
    async fn upsert_enriched(&self, article: &EnrichedArticle) -> Result<()>;
    async fn upsert_basic(&self, article: &RawArticle) -> Result<()>;
    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u32>;
    async fn deleted_urls(&self) -> Result<HashSet<String>>;
}

/// Start of the current UTC day, the budget accounting boundary.
pub fn midnight_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc()
}

fn basic_summary(snippet: &str) -> Option<String> {
    if snippet.is_empty() {
        return None;
    }
    Some(snippet.chars().take(BASIC_SUMMARY_MAX_CHARS).collect())
}

/// Postgres-backed store.
pub struct PgArticleStore {
    db: Pool<Postgres>,
}

impl PgArticleStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = PgPool::connect(database_url).await?;
        let store = Self { db };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                source_name TEXT NOT NULL,
                category TEXT NOT NULL,
                published_at TIMESTAMPTZ NOT NULL,
                full_text TEXT,
                summary TEXT,
                briefing TEXT,
                tags TEXT[] NOT NULL DEFAULT '{}',
                content_angles TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS deleted_urls (
                id BIGSERIAL PRIMARY KEY,
                url TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        info!("Article store schema ready");
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn exists(&self, url: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.is_some())
    }

    async fn upsert_enriched(&self, article: &EnrichedArticle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles
                (title, url, source_name, category, published_at, full_text,
                 summary, briefing, tags, content_angles)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(&article.article.title)
        .bind(&article.article.url)
        .bind(&article.article.source_name)
        .bind(article.article.category.as_str())
        .bind(article.article.published_at)
        .bind(&article.article.full_text)
        .bind(&article.summary)
        .bind(&article.briefing)
        .bind(&article.tags)
        .bind(&article.content_angles)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn upsert_basic(&self, article: &RawArticle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles
                (title, url, source_name, category, published_at, full_text,
                 summary, briefing, tags, content_angles)
            VALUES ($1, $2, $3, $4, $5, NULL, $6, NULL, '{}', '{}')
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.source_name)
        .bind(article.category.as_str())
        .bind(article.published_at)
        .bind(basic_summary(&article.snippet))
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM articles WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.db)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n.max(0) as u32)
    }

    async fn deleted_urls(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT url FROM deleted_urls")
            .fetch_all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.try_get::<String, _>("url").ok())
            .collect())
    }
}

/// In-memory store for tests and dry runs. Same contract as the Postgres
/// implementation, minus durability.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    saved: Vec<(String, DateTime<Utc>)>,
    deleted: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(urls: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().expect("memory store lock");
            let now = Utc::now();
            for url in urls {
                inner.saved.push((url.to_string(), now));
            }
        }
        store
    }

    pub fn mark_deleted(&self, url: &str) {
        self.inner
            .lock()
            .expect("memory store lock")
            .deleted
            .insert(url.to_string());
    }

    pub fn saved_urls(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("memory store lock")
            .saved
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn exists(&self, url: &str) -> Result<bool> {
        let inner = self.inner.lock().expect("memory store lock");
        Ok(inner.saved.iter().any(|(u, _)| u == url))
    }

    async fn upsert_enriched(&self, article: &EnrichedArticle) -> Result<()> {
        let mut inner = self.inner.lock().expect("memory store lock");
        if !inner.saved.iter().any(|(u, _)| u == &article.article.url) {
            inner.saved.push((article.article.url.clone(), Utc::now()));
        }
        Ok(())
    }

    async fn upsert_basic(&self, article: &RawArticle) -> Result<()> {
        let mut inner = self.inner.lock().expect("memory store lock");
        if !inner.saved.iter().any(|(u, _)| u == &article.url) {
            inner.saved.push((article.url.clone(), Utc::now()));
        }
        Ok(())
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u32> {
        let inner = self.inner.lock().expect("memory store lock");
        Ok(inner.saved.iter().filter(|(_, at)| *at >= since).count() as u32)
    }

    async fn deleted_urls(&self) -> Result<HashSet<String>> {
        let inner = self.inner.lock().expect("memory store lock");
        Ok(inner.deleted.clone())
    }
}
