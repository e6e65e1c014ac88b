mod common;

use common::article;
use feed_digest::budget::{partition, usage};
use feed_digest::types::{Category, ScoredArticle};

fn ranked(n: usize) -> Vec<ScoredArticle> {
    (0..n)
        .map(|i| ScoredArticle {
            article: article(
                &format!("https://x.test/{i}"),
                &format!("Story {i}"),
                "Blog",
                Category::Tech,
                1,
            ),
            score: (n - i) as i64 * 10,
        })
        .collect()
}

#[test]
fn partition_accounts_for_every_article() {
    let split = partition(ranked(30), 50, 20, 0);
    assert_eq!(split.quota, 20);
    assert_eq!(split.enrich.len(), 20);
    assert_eq!(split.basic.len(), 10);
    // Top-ranked articles fill the enrich track in order.
    assert_eq!(split.enrich[0].url, "https://x.test/0");
    assert_eq!(split.basic[0].url, "https://x.test/20");
}

#[test]
fn nearly_spent_budget_shrinks_the_quota() {
    let split = partition(ranked(30), 50, 20, 48);
    assert_eq!(split.quota, 2);
    assert_eq!(split.enrich.len(), 2);
    assert_eq!(split.basic.len(), 28);
}

#[test]
fn overspent_budget_sends_everything_to_the_basic_track() {
    let split = partition(ranked(10), 50, 20, 55);
    assert_eq!(split.quota, 0);
    assert!(split.enrich.is_empty());
    assert_eq!(split.basic.len(), 10);
}

#[test]
fn small_batch_leaves_the_basic_track_empty() {
    let split = partition(ranked(3), 50, 20, 0);
    assert_eq!(split.quota, 20);
    assert_eq!(split.enrich.len(), 3);
    assert!(split.basic.is_empty());
}

#[test]
fn usage_adds_this_run_and_saturates_remaining() {
    let snapshot = usage(10, 5, 50);
    assert_eq!(snapshot.used, 15);
    assert_eq!(snapshot.limit, 50);
    assert_eq!(snapshot.remaining, 35);

    let maxed = usage(48, 5, 50);
    assert_eq!(maxed.used, 53);
    assert_eq!(maxed.remaining, 0);
}
