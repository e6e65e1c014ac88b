//! Summarizer collaborator and the enrichment stage built on it.
//!
//! The stage guarantees 1:1 positional correspondence between its input and
//! output: a failed or short summarizer response degrades the affected
//! articles to empty analysis fields instead of dropping them or aborting
//! sibling batches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::DigestConfig;
use crate::extract::FullTextExtractor;
use crate::types::{DigestError, EnrichedArticle, RawArticle, Result};

/// Returned when no article carries a briefing, without spending a call.
pub const FALLBACK_INTRO: &str =
    "Here is today's roundup of AI, SEO, and tech news from across your sources.";

/// Per-article analysis produced by the summarizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub briefing: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "contentAngles")]
    pub content_angles: Vec<String>,
}

/// Parse outcome for a summarizer payload. Callers must handle both arms;
/// there is no optional-chaining default path.
#[derive(Debug)]
pub enum BriefingResponse {
    Parsed(Vec<ArticleAnalysis>),
    Malformed(String),
}

/// Accepts either a bare JSON array or an object wrapping the array in an
/// `articles` field. Anything else is malformed.
pub fn parse_briefing_response(raw: &str) -> BriefingResponse {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return BriefingResponse::Malformed(format!("invalid JSON: {e}")),
    };

    let array = match &value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get("articles") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return BriefingResponse::Malformed(
                    "expected an array or an object with an 'articles' array".to_string(),
                )
            }
        },
        _ => return BriefingResponse::Malformed("expected a JSON array or object".to_string()),
    };

    let mut analyses = Vec::with_capacity(array.len());
    for item in array {
        match serde_json::from_value::<ArticleAnalysis>(item) {
            Ok(analysis) => analyses.push(analysis),
            Err(e) => return BriefingResponse::Malformed(format!("bad article entry: {e}")),
        }
    }
    BriefingResponse::Parsed(analyses)
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Analyze one batch. May return fewer analyses than articles; the
    /// enrichment stage pads the tail with empty defaults.
    async fn briefings(&self, batch: &[RawArticle]) -> Result<Vec<ArticleAnalysis>>;

    /// One narrative paragraph summarizing the day's enriched articles.
    async fn digest_intro(&self, articles: &[EnrichedArticle]) -> Result<String>;
}

// --- OpenAI-compatible chat-completions client -------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiSummarizer {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiSummarizer {
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| DigestError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(DigestError::Http)?;

        Ok(Self {
            http,
            api_key,
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.clone(),
        })
    }

    async fn complete(&self, prompt: String, max_tokens: u32, json_mode: bool) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Summarizer(format!(
                "chat completion returned HTTP {status}"
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DigestError::Summarizer("empty completion".to_string()))
    }
}

fn briefing_prompt(batch: &[RawArticle]) -> String {
    let context: String = batch
        .iter()
        .enumerate()
        .map(|(idx, a)| {
            format!(
                "\nARTICLE {}:\nTitle: {}\nSource: {}\nCategory: {}\nURL: {}\nContent: {}\n---",
                idx + 1,
                a.title,
                a.source_name,
                a.category.as_str(),
                a.url,
                a.full_text.as_deref().unwrap_or(&a.snippet),
            )
        })
        .collect();

    format!(
        "You are a senior marketing strategist and content analyst helping a marketing \
professional stay informed on AI, SEO, and tech news.\n\n\
Analyze these articles and for EACH ONE provide:\n\n\
1. **Summary** (2-3 sentences): The key facts and why they matter\n\
2. **Briefing** (1-2 paragraphs): A deeper analysis suitable for a morning briefing. \
Include context, implications for marketing/business, and any connections to broader \
trends. Write in a clear, professional tone.\n\
3. **Tags** (3-5): Specific topic tags for filtering/searching\n\
4. **Content Angles** (2-3): Specific ideas for how this news could be turned into \
original content. Be specific, not generic.\n\n\
Format your response as a JSON object with an \"articles\" key containing an array. \
Each object should have: title, summary, briefing, tags (array), contentAngles (array).\n\
{context}\n\nRespond ONLY with valid JSON."
    )
}

fn intro_prompt(articles: &[EnrichedArticle]) -> String {
    let context: String = articles
        .iter()
        .map(|a| format!("- {} ({}): {}\n", a.article.title, a.article.source_name, a.summary))
        .collect();

    format!(
        "You are writing the introduction to a daily news digest for a marketing \
professional focused on AI, SEO, and tech.\n\n\
Based on these top stories from the last 24 hours, write a 2-3 paragraph executive \
summary highlighting:\n\
- The biggest story or theme of the day\n\
- Key developments worth paying attention to\n\
- Any patterns or connections across stories\n\n\
Keep it conversational but professional. No bullet points.\n\n\
Today's stories:\n{context}\nWrite the intro now:"
    )
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn briefings(&self, batch: &[RawArticle]) -> Result<Vec<ArticleAnalysis>> {
        let raw = self.complete(briefing_prompt(batch), 8000, true).await?;
        match parse_briefing_response(&raw) {
            BriefingResponse::Parsed(analyses) => Ok(analyses),
            BriefingResponse::Malformed(reason) => Err(DigestError::Summarizer(reason)),
        }
    }

    async fn digest_intro(&self, articles: &[EnrichedArticle]) -> Result<String> {
        self.complete(intro_prompt(articles), 1000, false).await
    }
}

// --- Enrichment stage --------------------------------------------------------

pub struct EnrichmentOutcome {
    pub articles: Vec<EnrichedArticle>,
    pub extracted: usize,
    pub failed_batches: usize,
}

/// Run both enrichment sub-phases over the enrich track.
///
/// Phase 1 fetches full bodies one by one (the extractor's fetcher paces
/// requests per host); phase 2 summarizes in fixed-size batches. Output
/// length always equals input length, position for position.
pub async fn enrich_articles(
    articles: Vec<RawArticle>,
    extractor: &dyn FullTextExtractor,
    summarizer: &dyn Summarizer,
    batch_size: usize,
) -> EnrichmentOutcome {
    let mut with_text = Vec::with_capacity(articles.len());
    let mut extracted = 0;
    for mut article in articles {
        article.full_text = extractor.extract(&article.url).await;
        if article.full_text.is_some() {
            extracted += 1;
        }
        with_text.push(article);
    }

    let batch_size = batch_size.max(1);
    let mut enriched = Vec::with_capacity(with_text.len());
    let mut failed_batches = 0;

    for batch in with_text.chunks(batch_size) {
        match summarizer.briefings(batch).await {
            Ok(analyses) => {
                debug!("Summarizer returned {} analyses for batch of {}", analyses.len(), batch.len());
                let mut analyses = analyses.into_iter();
                for article in batch {
                    // Positional mapping; a short response pads the tail
                    // with empty defaults.
                    let analysis = analyses.next().unwrap_or_default();
                    enriched.push(EnrichedArticle {
                        article: article.clone(),
                        summary: analysis.summary,
                        briefing: analysis.briefing,
                        tags: analysis.tags,
                        content_angles: analysis.content_angles,
                    });
                }
            }
            Err(e) => {
                warn!("Summarizer failed for batch of {}: {}", batch.len(), e);
                failed_batches += 1;
                for article in batch {
                    enriched.push(EnrichedArticle::without_analysis(article.clone()));
                }
            }
        }
    }

    EnrichmentOutcome {
        articles: enriched,
        extracted,
        failed_batches,
    }
}

/// Digest intro with pass-through failure into a safe default. Skips the
/// summarizer call entirely when nothing carries a briefing.
pub async fn generate_intro(
    summarizer: &dyn Summarizer,
    enriched: &[EnrichedArticle],
    top_n: usize,
) -> String {
    let briefed: Vec<EnrichedArticle> = enriched
        .iter()
        .filter(|a| !a.briefing.is_empty())
        .take(top_n)
        .cloned()
        .collect();

    if briefed.is_empty() {
        info!("No briefed articles; using fallback digest intro");
        return FALLBACK_INTRO.to_string();
    }

    match summarizer.digest_intro(&briefed).await {
        Ok(intro) if !intro.trim().is_empty() => intro,
        Ok(_) => FALLBACK_INTRO.to_string(),
        Err(e) => {
            warn!("Digest intro generation failed, using fallback: {}", e);
            FALLBACK_INTRO.to_string()
        }
    }
}

/// Convenience extractor used by tests and dry runs: always `None`.
pub struct NoopExtractor;

#[async_trait]
impl FullTextExtractor for NoopExtractor {
    async fn extract(&self, _url: &str) -> Option<String> {
        None
    }
}
