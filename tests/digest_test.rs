mod common;

use chrono::{TimeZone, Utc};

use common::article;
use feed_digest::digest::{digest_subject, render_html, render_text};
use feed_digest::types::{Category, EnrichedArticle};

fn enriched(url: &str, title: &str, category: Category) -> EnrichedArticle {
    EnrichedArticle {
        article: article(url, title, "Example Blog", category, 1),
        summary: format!("summary of {title}"),
        briefing: format!("briefing of {title}"),
        tags: vec!["ai".to_string()],
        content_angles: vec!["turn it into a newsletter".to_string()],
    }
}

#[test]
fn subject_carries_the_formatted_date() {
    let date = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
    assert_eq!(digest_subject(date), "Daily Digest - Monday, March 2, 2026");
}

#[test]
fn html_groups_by_category_and_escapes_content() {
    let articles = vec![
        enriched("https://x.test/a", "Agents news", Category::Agents),
        enriched("https://x.test/b", "Search <scripts> & tricks", Category::Seo),
    ];

    let html = render_html(&articles, "The intro paragraph.", Utc::now());

    assert!(html.contains("AI Agents"));
    assert!(html.contains("SEO & Search"));
    assert!(html.contains("The intro paragraph."));
    // Raw markup from titles must not survive.
    assert!(!html.contains("<scripts>"));
    assert!(html.contains("Search &lt;scripts&gt; &amp; tricks"));
    assert!(html.contains("briefing of Agents news"));
    assert!(html.contains("turn it into a newsletter"));
}

#[test]
fn text_rendering_lists_every_article_with_its_url() {
    let articles = vec![
        enriched("https://x.test/a", "Agents news", Category::Agents),
        enriched("https://x.test/b", "Search tricks", Category::Seo),
    ];

    let text = render_text(&articles, "The intro paragraph.", Utc::now());

    assert!(text.contains("DAILY DIGEST"));
    assert!(text.contains("TODAY'S OVERVIEW"));
    assert!(text.contains("* Agents news"));
    assert!(text.contains("https://x.test/b"));
    assert!(text.contains("briefing of Search tricks"));
    assert!(text.contains("Found 2 articles across 2 categories."));
}

#[test]
fn unbriefed_article_falls_back_to_its_summary() {
    let mut a = enriched("https://x.test/a", "Quiet story", Category::Tech);
    a.briefing = String::new();

    let text = render_text(&[a], "", Utc::now());
    assert!(text.contains("summary of Quiet story"));
}
