//! Daily enrichment budget: splits the ranked list into the subset worth a
//! summarizer call and the remainder saved as-is.

use crate::types::{DailyUsage, RawArticle, ScoredArticle};

/// Result of partitioning a ranked batch under the remaining daily quota.
pub struct Partition {
    pub enrich: Vec<RawArticle>,
    pub basic: Vec<RawArticle>,
    pub quota: u32,
}

/// `quota = min(max(0, daily_limit - used_today), per_run_cap)`; the top
/// `quota` ranked articles go to the enrich track, the rest to the basic
/// track. A quota of zero sends everything to the basic track; a batch
/// shorter than the quota leaves the basic track empty.
pub fn partition(
    ranked: Vec<ScoredArticle>,
    daily_limit: u32,
    per_run_cap: u32,
    used_today: u32,
) -> Partition {
    let remaining = daily_limit.saturating_sub(used_today);
    let quota = remaining.min(per_run_cap);

    let split_at = (quota as usize).min(ranked.len());
    let mut articles: Vec<RawArticle> = ranked.into_iter().map(|s| s.article).collect();
    let basic = articles.split_off(split_at);

    Partition {
        enrich: articles,
        basic,
        quota,
    }
}

/// Usage snapshot for the run report: `used` counts articles enriched today
/// including this run's.
pub fn usage(used_before: u32, enriched_this_run: u32, daily_limit: u32) -> DailyUsage {
    let used = used_before + enriched_this_run;
    DailyUsage {
        used,
        limit: daily_limit,
        remaining: daily_limit.saturating_sub(used),
    }
}
