//! Static source registry: every feed endpoint and scrape target the pipeline
//! pulls from, each with a fixed topic category.

use crate::scraper::ScrapeTarget;
use crate::types::{Category, FeedSource};

/// All registered RSS/Atom sources.
pub fn feed_sources() -> Vec<FeedSource> {
    use Category::*;

    vec![
        // AI agents & autonomous systems
        FeedSource::new("LangChain Blog", "https://blog.langchain.dev/rss/", Agents),
        FeedSource::new("LlamaIndex Blog", "https://www.llamaindex.ai/blog/rss.xml", Agents),
        FeedSource::new("AutoGPT Blog", "https://news.agpt.co/feed/", Agents),
        FeedSource::new("Crew AI Blog", "https://www.crewai.com/blog/rss.xml", Agents),
        FeedSource::new("AI Agent News (Reddit)", "https://www.reddit.com/r/AI_Agents/.rss", Agents),
        FeedSource::new("AutoGPT Reddit", "https://www.reddit.com/r/AutoGPT/.rss", Agents),
        FeedSource::new("LangChain Reddit", "https://www.reddit.com/r/LangChain/.rss", Agents),
        FeedSource::new("LocalLLaMA Reddit", "https://www.reddit.com/r/LocalLLaMA/.rss", Agents),
        FeedSource::new("Fixie AI Blog", "https://www.fixie.ai/blog/rss.xml", Agents),
        FeedSource::new("E2B Blog", "https://e2b.dev/blog/rss.xml", Agents),
        FeedSource::new("Lindy AI Blog", "https://www.lindy.ai/blog/rss.xml", Agents),
        FeedSource::new("AI Snake Oil", "https://aisnakeoil.substack.com/feed", Agents),
        FeedSource::new(
            "Ahead of AI (Sebastian Raschka)",
            "https://magazine.sebastianraschka.com/feed",
            Agents,
        ),
        FeedSource::new("AIModels.fyi", "https://aimodels.substack.com/feed", Agents),
        // General AI news
        FeedSource::new("The Rundown AI", "https://rss.beehiiv.com/feeds/2R3C6Bt5wj.xml", Ai),
        FeedSource::new(
            "MIT Technology Review - AI",
            "https://www.technologyreview.com/topic/artificial-intelligence/feed",
            Ai,
        ),
        FeedSource::new(
            "The Verge - AI",
            "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
            Ai,
        ),
        FeedSource::new(
            "Ars Technica - AI",
            "https://feeds.arstechnica.com/arstechnica/technology-lab",
            Ai,
        ),
        FeedSource::new("VentureBeat - AI", "https://venturebeat.com/category/ai/feed/", Ai),
        FeedSource::new("AI News", "https://www.artificialintelligence-news.com/feed/", Ai),
        FeedSource::new("OpenAI Blog", "https://openai.com/blog/rss.xml", Ai),
        FeedSource::new("Anthropic News", "https://www.anthropic.com/rss.xml", Ai),
        FeedSource::new("Google AI Blog", "https://blog.google/technology/ai/rss/", Ai),
        FeedSource::new("Google Keyword (All)", "https://blog.google/rss/", Tech),
        FeedSource::new("Google Gemini", "https://blog.google/products/gemini/rss/", Ai),
        FeedSource::new(
            "Google DeepMind Blog",
            "https://blog.google/technology/google-deepmind/rss/",
            Ai,
        ),
        FeedSource::new("Hugging Face Blog", "https://huggingface.co/blog/feed.xml", Ai),
        FeedSource::new("Meta AI Blog", "https://ai.meta.com/blog/rss/", Ai),
        FeedSource::new("Microsoft AI Blog", "https://blogs.microsoft.com/ai/feed/", Ai),
        FeedSource::new("DeepMind Blog", "https://deepmind.google/blog/rss.xml", Ai),
        FeedSource::new("Cohere Blog", "https://cohere.com/blog/rss.xml", Ai),
        FeedSource::new("Mistral AI Blog", "https://mistral.ai/feed.xml", Ai),
        // SEO & search
        FeedSource::new("Search Engine Journal", "https://www.searchenginejournal.com/feed/", Seo),
        FeedSource::new("Search Engine Land", "https://searchengineland.com/feed", Seo),
        FeedSource::new("Moz Blog", "https://moz.com/feeds/blog", Seo),
        FeedSource::new("Ahrefs Blog", "https://ahrefs.com/blog/feed/", Seo),
        FeedSource::new("Search Engine Roundtable", "https://www.seroundtable.com/feed", Seo),
        FeedSource::new("Semrush Blog", "https://www.semrush.com/blog/feed/", Seo),
        // General tech
        FeedSource::new("TechCrunch", "https://techcrunch.com/feed/", Tech),
        FeedSource::new("Wired", "https://www.wired.com/feed/rss", Tech),
        FeedSource::new("The Verge", "https://www.theverge.com/rss/index.xml", Tech),
        FeedSource::new("Hacker News - Best", "https://hnrss.org/best", Tech),
        // Marketing
        FeedSource::new("Marketing Week", "https://www.marketingweek.com/feed/", Marketing),
        FeedSource::new("HubSpot Blog", "https://blog.hubspot.com/marketing/rss.xml", Marketing),
    ]
}

/// Targets without a feed protocol, covered by the pattern-extraction adapter.
pub fn scrape_targets() -> Vec<ScrapeTarget> {
    vec![ScrapeTarget::artificial_analysis()]
}
