mod common;

use chrono::{Duration, Utc};

use common::{article, BrokenExistsStore};
use feed_digest::processing::{dedupe_batch, filter_known, filter_recent};
use feed_digest::store::MemoryStore;
use feed_digest::types::Category;

#[test]
fn recency_cutoff_is_inclusive() {
    let now = Utc::now();
    let mut at_cutoff = article("https://x.test/edge", "Edge", "Blog", Category::Tech, 0);
    at_cutoff.published_at = now - Duration::hours(24);
    let mut just_over = article("https://x.test/old", "Old", "Blog", Category::Tech, 0);
    just_over.published_at = now - Duration::hours(24) - Duration::seconds(1);

    let kept = filter_recent(vec![at_cutoff, just_over], 24, now);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].url, "https://x.test/edge");
}

#[test]
fn unreliable_timestamps_bypass_the_recency_filter() {
    let now = Utc::now();
    let mut stale = article("https://x.test/stale", "Stale", "Blog", Category::Tech, 96);
    stale.has_reliable_timestamp = false;

    let kept = filter_recent(vec![stale], 24, now);
    assert_eq!(kept.len(), 1);
}

#[test]
fn dedupe_keeps_first_occurrence_per_url() {
    let batch = vec![
        article("https://x.test/a", "First copy", "Blog A", Category::Tech, 1),
        article("https://x.test/b", "Unique", "Blog B", Category::Ai, 2),
        article("https://x.test/a", "Second copy", "Blog C", Category::Seo, 3),
    ];

    let unique = dedupe_batch(batch);
    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].title, "First copy");
    assert_eq!(unique[1].url, "https://x.test/b");
}

#[tokio::test]
async fn history_filter_separates_known_deleted_and_fresh() {
    let store = MemoryStore::with_existing(&["https://x.test/known"]);
    store.mark_deleted("https://x.test/removed");

    let batch = vec![
        article("https://x.test/known", "Known", "Blog", Category::Tech, 1),
        article("https://x.test/removed", "Removed", "Blog", Category::Tech, 2),
        article("https://x.test/fresh", "Fresh", "Blog", Category::Tech, 3),
    ];

    let outcome = filter_known(batch, &store).await;
    assert_eq!(outcome.known_duplicates, 1);
    assert_eq!(outcome.soft_deleted, 1);
    assert_eq!(outcome.fresh.len(), 1);
    assert_eq!(outcome.fresh[0].url, "https://x.test/fresh");
}

#[tokio::test]
async fn store_errors_fail_open_to_keeping_articles() {
    let store = BrokenExistsStore;
    let batch = vec![
        article("https://x.test/a", "A", "Blog", Category::Tech, 1),
        article("https://x.test/b", "B", "Blog", Category::Tech, 2),
    ];

    let outcome = filter_known(batch, &store).await;
    assert_eq!(outcome.fresh.len(), 2);
    assert_eq!(outcome.known_duplicates, 0);
    assert_eq!(outcome.soft_deleted, 0);
}
