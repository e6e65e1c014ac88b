use std::env;

use crate::types::{Category, DigestError, Result};

/// Pipeline tuning knobs. Pure data, independent of the environment, so tests
/// can construct variants directly.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Trailing recency window for feed articles.
    pub window_hours: i64,
    /// Hard cap on summarizer-enriched articles per UTC day.
    pub daily_ai_limit: u32,
    /// Cap on summarizer-enriched articles in a single run.
    pub max_ai_per_run: u32,
    /// Articles per summarizer call. Bounds prompt size and request latency.
    pub briefing_batch_size: usize,
    /// How many enriched articles feed the digest intro prompt.
    pub intro_top_n: usize,
    /// Worst-case records accepted from one scraped (feedless) source.
    pub scrape_max_items: usize,
    /// Pause between scrape requests against the same host.
    pub scrape_delay_ms: u64,
    /// Feed fetch timeout.
    pub fetch_timeout_secs: u64,
    /// Sources whose articles get a +100 priority boost (substring match).
    pub priority_sources: Vec<String>,
    /// Categories whose articles get a +50 priority boost.
    pub priority_categories: Vec<Category>,
    /// Title keywords worth +10 each (case-insensitive, counted independently).
    pub boost_keywords: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_hours: 24,
            daily_ai_limit: 50,
            max_ai_per_run: 20,
            briefing_batch_size: 5,
            intro_top_n: 15,
            scrape_max_items: 10,
            scrape_delay_ms: 500,
            fetch_timeout_secs: 10,
            priority_sources: [
                "OpenAI Blog",
                "Anthropic News",
                "Google DeepMind Blog",
                "Google Gemini",
                "Google AI Blog",
                "LangChain Blog",
                "Artificial Analysis",
                "MIT Technology Review",
                "The Rundown AI",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            priority_categories: vec![Category::Agents, Category::Ai],
            boost_keywords: [
                "launch",
                "announce",
                "release",
                "new",
                "breakthrough",
                "gpt",
                "claude",
                "gemini",
                "agent",
                "llm",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Process-level configuration, built once in `main` and threaded through.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub database_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub smtp_host: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub email_from: String,
    /// No recipient means the email stage is skipped, not an error.
    pub recipient_email: Option<String>,
    /// Shared secret guarding the HTTP run trigger. Absent = open access.
    pub cron_secret: Option<String>,
    pub bind_addr: String,
    pub settings: PipelineSettings,
}

impl DigestConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| DigestError::Config("DATABASE_URL is not set".to_string()))?;

        Ok(Self {
            database_url,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_pass: env::var("SMTP_PASS").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Daily Digest <digest@localhost>".to_string()),
            recipient_email: env::var("DIGEST_RECIPIENT_EMAIL").ok(),
            cron_secret: env::var("CRON_SECRET").ok(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            settings: PipelineSettings::default(),
        })
    }
}
