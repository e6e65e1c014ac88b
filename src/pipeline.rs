//! Run orchestrator: one linear pass from fetch to email. Every stage appends
//! a human-readable line to the run log, failures are absorbed at the
//! smallest possible scope, and only an unanticipated error escalates to a
//! failed run — with the log still returned.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::aggregator::Aggregator;
use crate::briefing::{enrich_articles, generate_intro, Summarizer};
use crate::budget::{partition, usage};
use crate::config::PipelineSettings;
use crate::digest::{digest_subject, render_html, render_text, EmailSink};
use crate::extract::FullTextExtractor;
use crate::processing::{dedupe_batch, filter_known, filter_recent};
use crate::scoring::rank;
use crate::store::{midnight_utc, ArticleStore};
use crate::types::{DailyUsage, EnrichedArticle, RawArticle, Result, RunReport};

pub struct Pipeline {
    aggregator: Aggregator,
    store: Arc<dyn ArticleStore>,
    extractor: Arc<dyn FullTextExtractor>,
    summarizer: Arc<dyn Summarizer>,
    email: Option<Arc<dyn EmailSink>>,
    recipient: Option<String>,
    settings: PipelineSettings,
}

struct RunStats {
    total_new: usize,
    ai_processed: usize,
    saved_without_ai: usize,
    daily_usage: DailyUsage,
}

impl Pipeline {
    pub fn new(
        aggregator: Aggregator,
        store: Arc<dyn ArticleStore>,
        extractor: Arc<dyn FullTextExtractor>,
        summarizer: Arc<dyn Summarizer>,
        email: Option<Arc<dyn EmailSink>>,
        recipient: Option<String>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            aggregator,
            store,
            extractor,
            summarizer,
            email,
            recipient,
            settings,
        }
    }

    /// Execute one full run. Never returns an error: a catastrophic failure
    /// becomes a `FAILED` report carrying the log accumulated so far.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let mut log = Vec::new();

        info!("Starting digest run {}", run_id);

        let outcome = self.execute(&mut log).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(stats) => {
                log.push(format!("Completed in {duration_ms}ms"));
                info!("Run {} done: {} new articles", run_id, stats.total_new);
                RunReport {
                    run_id,
                    success: true,
                    total_new: stats.total_new,
                    ai_processed: stats.ai_processed,
                    saved_without_ai: stats.saved_without_ai,
                    daily_usage: stats.daily_usage,
                    duration_ms,
                    log,
                    error: None,
                }
            }
            Err(e) => {
                error!("Run {} failed: {}", run_id, e);
                log.push(format!("Error: {e}"));
                RunReport {
                    run_id,
                    success: false,
                    total_new: 0,
                    ai_processed: 0,
                    saved_without_ai: 0,
                    daily_usage: DailyUsage {
                        used: 0,
                        limit: self.settings.daily_ai_limit,
                        remaining: self.settings.daily_ai_limit,
                    },
                    duration_ms,
                    log,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn execute(&self, log: &mut Vec<String>) -> Result<RunStats> {
        let now = Utc::now();
        let limit = self.settings.daily_ai_limit;

        // FETCH
        log.push(format!(
            "Fetching {} sources...",
            self.aggregator.source_count()
        ));
        let aggregate = self.aggregator.fetch_all().await;
        log.push(format!(
            "Fetched {} articles from {} sources ({} failed)",
            aggregate.articles.len(),
            aggregate.sources_ok,
            aggregate.sources_failed
        ));

        // FILTER_DEDUPE (recency + in-batch)
        let recent = filter_recent(aggregate.articles, self.settings.window_hours, now);
        let mut unique = dedupe_batch(recent);
        unique.sort_by_key(|a| std::cmp::Reverse(a.published_at));
        log.push(format!(
            "{} unique articles from the last {} hours",
            unique.len(),
            self.settings.window_hours
        ));

        if unique.is_empty() {
            log.push("No new articles found".to_string());
            return Ok(self.empty_stats(now).await);
        }

        // FILTER_DEDUPE (against history)
        let history = filter_known(unique, self.store.as_ref()).await;
        log.push(format!(
            "{} duplicates, {} deleted, {} new",
            history.known_duplicates,
            history.soft_deleted,
            history.fresh.len()
        ));

        if history.fresh.is_empty() {
            log.push("No new articles to save".to_string());
            return Ok(self.empty_stats(now).await);
        }

        let total_new = history.fresh.len();

        // BUDGET_CHECK
        let used_today = self.used_today(now).await;
        log.push(format!("AI budget: {used_today}/{limit} used today"));

        // SCORE_RANK + PARTITION
        let ranked = rank(history.fresh, &self.settings);
        let split = partition(ranked, limit, self.settings.max_ai_per_run, used_today);
        log.push(format!(
            "Selected {} for AI ({} available), {} without AI",
            split.enrich.len(),
            split.quota,
            split.basic.len()
        ));

        // ENRICH — skipped outright when the quota or batch is empty.
        let mut enriched: Vec<EnrichedArticle> = Vec::new();
        let mut ai_processed = 0;
        if !split.enrich.is_empty() {
            log.push("Extracting full text...".to_string());
            let outcome = enrich_articles(
                split.enrich,
                self.extractor.as_ref(),
                self.summarizer.as_ref(),
                self.settings.briefing_batch_size,
            )
            .await;
            log.push(format!(
                "Extracted text for {} articles; generated {} briefings ({} batches failed)",
                outcome.extracted,
                outcome.articles.len(),
                outcome.failed_batches
            ));

            enriched = outcome.articles;
            ai_processed = enriched.len();

            // SAVE_ENRICHED
            let (saved, errors) = self.save_enriched(&enriched).await;
            log.push(format!("Saved {saved} AI articles ({errors} errors)"));
        }

        // SAVE_BASIC
        let mut saved_without_ai = 0;
        if !split.basic.is_empty() {
            let (saved, errors) = self.save_basic(&split.basic).await;
            saved_without_ai = saved;
            log.push(format!("Saved {saved} basic articles ({errors} errors)"));
        }

        // GENERATE_INTRO + SEND_EMAIL
        if !enriched.is_empty() {
            log.push("Generating digest introduction...".to_string());
            let intro =
                generate_intro(self.summarizer.as_ref(), &enriched, self.settings.intro_top_n)
                    .await;

            match (&self.email, &self.recipient) {
                (Some(sink), Some(recipient)) => {
                    log.push(format!("Sending digest email to {recipient}..."));
                    let html = render_html(&enriched, &intro, now);
                    let text = render_text(&enriched, &intro, now);
                    match sink.send(&html, &text, &digest_subject(now), recipient).await {
                        Ok(()) => log.push("Email sent successfully".to_string()),
                        Err(e) => log.push(format!("Email failed: {e}")),
                    }
                }
                _ => log.push("No recipient configured, skipping email".to_string()),
            }
        } else {
            log.push("No AI articles to email".to_string());
        }

        Ok(RunStats {
            total_new,
            ai_processed,
            saved_without_ai,
            daily_usage: usage(used_today, ai_processed as u32, limit),
        })
    }

    /// Budget accounting reads fail open: a degraded store reports zero used
    /// rather than wedging enrichment until midnight.
    async fn used_today(&self, now: chrono::DateTime<Utc>) -> u32 {
        match self.store.count_created_since(midnight_utc(now)).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Daily count unavailable, assuming 0: {}", e);
                0
            }
        }
    }

    async fn empty_stats(&self, now: chrono::DateTime<Utc>) -> RunStats {
        let used = self.used_today(now).await;
        RunStats {
            total_new: 0,
            ai_processed: 0,
            saved_without_ai: 0,
            daily_usage: usage(used, 0, self.settings.daily_ai_limit),
        }
    }

    async fn save_enriched(&self, articles: &[EnrichedArticle]) -> (usize, usize) {
        let mut saved = 0;
        let mut errors = 0;
        for article in articles {
            match self.store.upsert_enriched(article).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    warn!("Failed to save {}: {}", article.article.url, e);
                    errors += 1;
                }
            }
        }
        (saved, errors)
    }

    async fn save_basic(&self, articles: &[RawArticle]) -> (usize, usize) {
        let mut saved = 0;
        let mut errors = 0;
        for article in articles {
            match self.store.upsert_basic(article).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    warn!("Failed to save {}: {}", article.url, e);
                    errors += 1;
                }
            }
        }
        (saved, errors)
    }
}
