mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{article, RecordingSink, ScriptedSummarizer, StaticSource, SummarizerScript};
use feed_digest::aggregator::{Aggregator, ArticleSource};
use feed_digest::briefing::NoopExtractor;
use feed_digest::config::PipelineSettings;
use feed_digest::pipeline::Pipeline;
use feed_digest::store::MemoryStore;
use feed_digest::types::{Category, RawArticle};

struct Harness {
    pipeline: Pipeline,
    store: Arc<MemoryStore>,
    summarizer: Arc<ScriptedSummarizer>,
    sink: Arc<RecordingSink>,
}

fn harness(
    sources: Vec<Arc<dyn ArticleSource>>,
    store: MemoryStore,
    script: SummarizerScript,
) -> Harness {
    let store = Arc::new(store);
    let summarizer = Arc::new(ScriptedSummarizer::new(script));
    let sink = Arc::new(RecordingSink::default());

    let pipeline = Pipeline::new(
        Aggregator::new(sources),
        store.clone(),
        Arc::new(NoopExtractor),
        summarizer.clone(),
        Some(sink.clone()),
        Some("reader@example.com".to_string()),
        PipelineSettings::default(),
    );

    Harness {
        pipeline,
        store,
        summarizer,
        sink,
    }
}

fn batch(prefix: &str, n: usize) -> Vec<RawArticle> {
    (0..n)
        .map(|i| {
            article(
                &format!("https://{prefix}.test/{i}"),
                &format!("{prefix} story {i}"),
                &format!("{prefix} blog"),
                Category::Tech,
                1,
            )
        })
        .collect()
}

fn log_contains(log: &[String], needle: &str) -> bool {
    log.iter().any(|line| line.contains(needle))
}

#[tokio::test]
async fn full_run_dedupes_enriches_saves_and_emails() {
    let alpha = batch("alpha", 5);
    let mut beta = batch("beta", 4);
    // One cross-source duplicate of an alpha URL.
    let mut dup = alpha[0].clone();
    dup.source_name = "beta blog".to_string();
    beta.push(dup);

    let sources: Vec<Arc<dyn ArticleSource>> = vec![
        Arc::new(StaticSource::ok("alpha", alpha)),
        Arc::new(StaticSource::ok("beta", beta)),
        Arc::new(StaticSource::failing("gamma")),
    ];

    let h = harness(sources, MemoryStore::new(), SummarizerScript::Echo);
    let report = h.pipeline.run().await;

    assert!(report.success);
    assert!(report.error.is_none());
    assert_eq!(report.total_new, 9);
    assert_eq!(report.ai_processed, 9);
    assert_eq!(report.saved_without_ai, 0);
    assert_eq!(report.daily_usage.used, 9);
    assert_eq!(report.daily_usage.remaining, 41);

    assert!(log_contains(&report.log, "Fetched 10 articles from 2 sources (1 failed)"));
    assert!(log_contains(&report.log, "9 unique articles"));
    assert!(log_contains(&report.log, "Email sent successfully"));

    assert_eq!(h.store.saved_urls().len(), 9);

    let sent = h.sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].0.starts_with("Daily Digest - "));
    assert_eq!(sent[0].1, "reader@example.com");
}

#[tokio::test]
async fn exhausted_budget_skips_enrichment_entirely() {
    let existing: Vec<String> = (0..50).map(|i| format!("https://old.test/{i}")).collect();
    let existing_refs: Vec<&str> = existing.iter().map(String::as_str).collect();
    let store = MemoryStore::with_existing(&existing_refs);

    let sources: Vec<Arc<dyn ArticleSource>> =
        vec![Arc::new(StaticSource::ok("alpha", batch("alpha", 4)))];

    let h = harness(sources, store, SummarizerScript::Echo);
    let report = h.pipeline.run().await;

    assert!(report.success);
    assert_eq!(report.ai_processed, 0);
    assert_eq!(report.saved_without_ai, 4);
    assert_eq!(report.daily_usage.used, 50);
    assert_eq!(report.daily_usage.remaining, 0);
    assert_eq!(h.summarizer.briefing_calls.load(Ordering::SeqCst), 0);

    assert!(log_contains(&report.log, "AI budget: 50/50 used today"));
    assert!(log_contains(&report.log, "No AI articles to email"));
    assert!(h.sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn history_and_soft_deletes_are_excluded() {
    let store = MemoryStore::with_existing(&["https://alpha.test/0"]);
    store.mark_deleted("https://alpha.test/1");

    let sources: Vec<Arc<dyn ArticleSource>> =
        vec![Arc::new(StaticSource::ok("alpha", batch("alpha", 4)))];

    let h = harness(sources, store, SummarizerScript::Echo);
    let report = h.pipeline.run().await;

    assert!(report.success);
    assert_eq!(report.total_new, 2);
    assert!(log_contains(&report.log, "1 duplicates, 1 deleted, 2 new"));

    let saved = h.store.saved_urls();
    assert!(!saved.contains(&"https://alpha.test/1".to_string()));
    assert!(saved.contains(&"https://alpha.test/2".to_string()));
}

#[tokio::test]
async fn summarizer_outage_still_saves_and_emails() {
    let sources: Vec<Arc<dyn ArticleSource>> =
        vec![Arc::new(StaticSource::ok("alpha", batch("alpha", 3)))];

    let h = harness(sources, MemoryStore::new(), SummarizerScript::Fail);
    let report = h.pipeline.run().await;

    assert!(report.success);
    assert_eq!(report.ai_processed, 3);
    assert_eq!(h.store.saved_urls().len(), 3);
    assert!(log_contains(&report.log, "1 batches failed"));

    // The digest still goes out, carrying the fallback intro.
    assert_eq!(h.sink.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn stale_articles_are_filtered_before_anything_else() {
    let mut articles = batch("alpha", 2);
    articles.push(article(
        "https://alpha.test/stale",
        "old story",
        "alpha blog",
        Category::Tech,
        48,
    ));

    let sources: Vec<Arc<dyn ArticleSource>> =
        vec![Arc::new(StaticSource::ok("alpha", articles))];

    let h = harness(sources, MemoryStore::new(), SummarizerScript::Echo);
    let report = h.pipeline.run().await;

    assert_eq!(report.total_new, 2);
    assert!(!h.store.saved_urls().contains(&"https://alpha.test/stale".to_string()));
}

#[tokio::test]
async fn run_with_nothing_new_short_circuits() {
    let sources: Vec<Arc<dyn ArticleSource>> =
        vec![Arc::new(StaticSource::ok("alpha", Vec::new()))];

    let h = harness(sources, MemoryStore::new(), SummarizerScript::Echo);
    let report = h.pipeline.run().await;

    assert!(report.success);
    assert_eq!(report.total_new, 0);
    assert_eq!(report.ai_processed, 0);
    assert!(log_contains(&report.log, "No new articles found"));
    assert!(h.sink.sent.lock().unwrap().is_empty());
    assert_eq!(h.summarizer.briefing_calls.load(Ordering::SeqCst), 0);
}
