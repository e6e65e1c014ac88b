//! Deterministic article scoring and ranking. No I/O, no clock, no
//! randomness: identical input and settings always produce the same order.

use crate::config::PipelineSettings;
use crate::types::{RawArticle, ScoredArticle};

/// Priority score for one article:
/// +100 when the source matches a priority source (substring),
/// +50 when the category is a priority category,
/// +10 per boost keyword found in the title (case-insensitive, overlapping
/// keywords each count).
pub fn score_article(article: &RawArticle, settings: &PipelineSettings) -> i64 {
    let mut score = 0;

    if settings
        .priority_sources
        .iter()
        .any(|s| article.source_name.contains(s.as_str()))
    {
        score += 100;
    }

    if settings.priority_categories.contains(&article.category) {
        score += 50;
    }

    let title_lower = article.title.to_lowercase();
    for keyword in &settings.boost_keywords {
        if title_lower.contains(keyword.as_str()) {
            score += 10;
        }
    }

    score
}

/// Score and sort descending. The sort is stable, so ties keep their relative
/// input order — no secondary key needed.
pub fn rank(articles: Vec<RawArticle>, settings: &PipelineSettings) -> Vec<ScoredArticle> {
    let mut scored: Vec<ScoredArticle> = articles
        .into_iter()
        .map(|article| ScoredArticle {
            score: score_article(&article, settings),
            article,
        })
        .collect();

    scored.sort_by_key(|s| std::cmp::Reverse(s.score));
    scored
}
