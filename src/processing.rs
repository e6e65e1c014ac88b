//! Batch shaping between fetch and scoring: recency filtering, in-batch
//! deduplication, and exclusion of articles the store already knows.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::store::ArticleStore;
use crate::types::RawArticle;

/// Keep articles published inside the trailing window (inclusive cutoff).
/// Articles without a reliable timestamp are admitted unconditionally —
/// their placeholder dates say nothing about staleness.
pub fn filter_recent(
    articles: Vec<RawArticle>,
    window_hours: i64,
    now: DateTime<Utc>,
) -> Vec<RawArticle> {
    let cutoff = now - Duration::hours(window_hours);
    articles
        .into_iter()
        .filter(|a| !a.has_reliable_timestamp || a.published_at >= cutoff)
        .collect()
}

/// First occurrence per URL wins, in input order.
pub fn dedupe_batch(articles: Vec<RawArticle>) -> Vec<RawArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| seen.insert(a.url.clone()))
        .collect()
}

/// Tally of the against-history phase, for the run log.
pub struct HistoryFilterOutcome {
    pub fresh: Vec<RawArticle>,
    pub known_duplicates: usize,
    pub soft_deleted: usize,
}

/// Drop articles the store already holds or the operator soft-deleted.
///
/// A store error on an existence check is treated as "not a duplicate"
/// (fail-open): availability over consistency, since the upsert path ignores
/// conflicts anyway. The deleted-url set degrades to empty on error for the
/// same reason.
pub async fn filter_known(
    articles: Vec<RawArticle>,
    store: &dyn ArticleStore,
) -> HistoryFilterOutcome {
    let deleted = match store.deleted_urls().await {
        Ok(set) => set,
        Err(e) => {
            warn!("Failed to load deleted URLs, proceeding without: {}", e);
            HashSet::new()
        }
    };

    let mut fresh = Vec::new();
    let mut known_duplicates = 0;
    let mut soft_deleted = 0;

    for article in articles {
        if deleted.contains(&article.url) {
            soft_deleted += 1;
            continue;
        }
        match store.exists(&article.url).await {
            Ok(true) => known_duplicates += 1,
            Ok(false) => fresh.push(article),
            Err(e) => {
                warn!("Existence check failed for {}, keeping article: {}", article.url, e);
                fresh.push(article);
            }
        }
    }

    debug!(
        "History filter: {} fresh, {} known, {} deleted",
        fresh.len(),
        known_duplicates,
        soft_deleted
    );

    HistoryFilterOutcome {
        fresh,
        known_duplicates,
        soft_deleted,
    }
}
