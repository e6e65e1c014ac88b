use chrono::{TimeZone, Utc};

use feed_digest::fetcher::parse_feed;
use feed_digest::types::{Category, DigestError, FeedSource};

fn source() -> FeedSource {
    FeedSource::new("Example Feed", "https://example.com/rss", Category::Ai)
}

#[test]
fn parses_complete_rss_entry() {
    let body = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <item>
      <title>New Model Released</title>
      <link>https://example.com/posts/new-model</link>
      <description>A short description of the release.</description>
      <pubDate>Mon, 24 Aug 2026 09:30:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    let now = Utc::now();
    let articles = parse_feed(body, &source(), now).unwrap();

    assert_eq!(articles.len(), 1);
    let article = &articles[0];
    assert_eq!(article.title, "New Model Released");
    assert_eq!(article.url, "https://example.com/posts/new-model");
    assert_eq!(article.source_name, "Example Feed");
    assert_eq!(article.category, Category::Ai);
    assert_eq!(article.snippet, "A short description of the release.");
    assert!(article.has_reliable_timestamp);
    assert_eq!(
        article.published_at,
        Utc.with_ymd_and_hms(2026, 8, 24, 9, 30, 0).unwrap()
    );
    assert!(article.full_text.is_none());
}

#[test]
fn missing_title_falls_back_to_placeholder() {
    let body = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <item>
      <link>https://example.com/posts/untitled</link>
      <pubDate>Mon, 24 Aug 2026 09:30:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    let articles = parse_feed(body, &source(), Utc::now()).unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Untitled");
}

#[test]
fn missing_date_gets_placeholder_and_unreliable_flag() {
    let body = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <item>
      <title>No Date Here</title>
      <link>https://example.com/posts/no-date</link>
    </item>
  </channel>
</rss>"#;

    let now = Utc::now();
    let articles = parse_feed(body, &source(), now).unwrap();
    assert_eq!(articles.len(), 1);
    assert!(!articles[0].has_reliable_timestamp);
    assert_eq!(articles[0].published_at, now);
}

#[test]
fn entry_without_link_is_dropped() {
    let body = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <item>
      <title>Linkless</title>
      <pubDate>Mon, 24 Aug 2026 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Has Link</title>
      <link>https://example.com/posts/linked</link>
      <pubDate>Mon, 24 Aug 2026 10:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    let articles = parse_feed(body, &source(), Utc::now()).unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Has Link");
}

#[test]
fn malformed_body_is_a_parse_error() {
    let result = parse_feed("this is not a feed", &source(), Utc::now());
    assert!(matches!(result, Err(DigestError::Parse(_))));
}
