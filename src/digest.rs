//! Digest rendering and the outbound email sink. The digest is the intro
//! paragraph plus enriched articles grouped by category, rendered as both
//! HTML and a plain-text alternative.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::DigestConfig;
use crate::types::{Category, DigestError, EnrichedArticle, Result};

/// At most this many articles are shown per category section.
const MAX_PER_CATEGORY: usize = 10;

/// Fixed category order for the digest sections.
const CATEGORY_ORDER: [Category; 5] = [
    Category::Agents,
    Category::Ai,
    Category::Seo,
    Category::Tech,
    Category::Marketing,
];

#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn send(&self, html: &str, text: &str, subject: &str, recipient: &str) -> Result<()>;
}

/// SMTP-backed sink.
pub struct SmtpSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSink {
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .clone()
            .ok_or_else(|| DigestError::Config("SMTP_HOST is not set".to_string()))?;
        let user = config
            .smtp_user
            .clone()
            .ok_or_else(|| DigestError::Config("SMTP_USER is not set".to_string()))?;
        let pass = config
            .smtp_pass
            .clone()
            .ok_or_else(|| DigestError::Config("SMTP_PASS is not set".to_string()))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| DigestError::Email(format!("invalid SMTP host: {e}")))?
            .credentials(Credentials::new(user, pass))
            .build();

        let from = config
            .email_from
            .parse()
            .map_err(|e| DigestError::Email(format!("invalid EMAIL_FROM: {e}")))?;

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl EmailSink for SmtpSink {
    async fn send(&self, html: &str, text: &str, subject: &str, recipient: &str) -> Result<()> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| DigestError::Email(format!("invalid recipient: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))
            .map_err(|e| DigestError::Email(format!("build message: {e}")))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| DigestError::Email(format!("send: {e}")))?;

        info!("Digest email sent to {}", recipient);
        Ok(())
    }
}

pub fn digest_subject(date: DateTime<Utc>) -> String {
    format!("Daily Digest - {}", date.format("%A, %B %-d, %Y"))
}

fn group_by_category(articles: &[EnrichedArticle]) -> Vec<(Category, Vec<&EnrichedArticle>)> {
    CATEGORY_ORDER
        .iter()
        .filter_map(|&category| {
            let group: Vec<&EnrichedArticle> = articles
                .iter()
                .filter(|a| a.article.category == category)
                .take(MAX_PER_CATEGORY)
                .collect();
            (!group.is_empty()).then_some((category, group))
        })
        .collect()
}

/// HTML body: intro callout, a small stats bar, then category sections with
/// one card per article.
pub fn render_html(articles: &[EnrichedArticle], intro: &str, date: DateTime<Utc>) -> String {
    let grouped = group_by_category(articles);
    let with_angles = articles.iter().filter(|a| !a.content_angles.is_empty()).count();

    let mut sections = String::new();
    for (category, group) in &grouped {
        let mut cards = String::new();
        for article in group {
            let body = if !article.briefing.is_empty() {
                &article.briefing
            } else {
                &article.summary
            };

            let tags = if article.tags.is_empty() {
                String::new()
            } else {
                let spans: String = article
                    .tags
                    .iter()
                    .map(|t| {
                        format!(
                            r#"<span style="display:inline-block;background:#f3f4f6;color:#4b5563;padding:4px 10px;border-radius:100px;font-size:12px;margin:0 6px 6px 0;">{}</span>"#,
                            encode_text(t)
                        )
                    })
                    .collect();
                format!(r#"<p style="margin:0 0 16px 0;">{spans}</p>"#)
            };

            let angles = if article.content_angles.is_empty() {
                String::new()
            } else {
                let lines: String = article
                    .content_angles
                    .iter()
                    .map(|a| {
                        format!(
                            r#"<p style="margin:0 0 4px 0;font-size:13px;color:#78350f;padding-left:12px;">&rarr; {}</p>"#,
                            encode_text(a)
                        )
                    })
                    .collect();
                format!(
                    r#"<div style="background:#fef3c7;border-radius:8px;padding:14px 16px;margin-top:4px;">
<p style="margin:0 0 8px 0;font-size:12px;font-weight:600;color:#92400e;">CONTENT IDEAS</p>{lines}</div>"#
                )
            };

            cards.push_str(&format!(
                r#"<div style="background:#ffffff;border-radius:12px;border:1px solid #e5e7eb;padding:20px;margin-bottom:24px;">
<p style="margin:0 0 8px 0;font-size:12px;color:#6b7280;font-weight:500;">{source} &middot; {date}</p>
<h3 style="margin:0 0 12px 0;font-size:18px;line-height:1.4;"><a href="{url}" style="color:#111827;text-decoration:none;">{title}</a></h3>
<p style="margin:0 0 16px 0;color:#374151;font-size:15px;line-height:1.7;">{body}</p>
{tags}{angles}
<p style="margin-top:16px;"><a href="{url}" style="display:inline-block;padding:10px 20px;background:#111827;border-radius:6px;color:#ffffff;text-decoration:none;font-size:13px;font-weight:500;">Read Article &rarr;</a></p>
</div>"#,
                source = encode_text(&article.article.source_name),
                date = article.article.published_at.format("%b %-d"),
                url = encode_text(&article.article.url),
                title = encode_text(&article.article.title),
                body = encode_text(body),
                tags = tags,
                angles = angles,
            ));
        }

        sections.push_str(&format!(
            r#"<div style="margin-bottom:32px;">
<p style="margin-bottom:20px;"><span style="display:inline-block;background:#dbeafe;color:#1d4ed8;padding:8px 16px;border-radius:100px;font-size:14px;font-weight:600;">{label}</span>
<span style="color:#9ca3af;font-size:13px;margin-left:12px;">{count} article{plural}</span></p>
{cards}</div>"#,
            label = category.label(),
            count = group.len(),
            plural = if group.len() > 1 { "s" } else { "" },
            cards = cards,
        ));
    }

    let intro_block = if intro.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div style="background:#eff6ff;border-radius:12px;border-left:4px solid #3b82f6;padding:24px;margin-bottom:24px;">
<h2 style="margin:0 0 12px 0;font-size:14px;font-weight:600;color:#1e40af;text-transform:uppercase;letter-spacing:0.5px;">Today's Overview</h2>
<p style="margin:0;color:#1e3a5f;font-size:15px;line-height:1.8;">{}</p>
</div>"#,
            encode_text(intro)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"><title>Daily Digest</title></head>
<body style="margin:0;padding:0;background:#f3f4f6;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,'Helvetica Neue',Arial,sans-serif;">
<div style="max-width:640px;margin:0 auto;padding:40px 20px;">
<div style="background:#ffffff;border-radius:16px;overflow:hidden;">
<div style="background:#1e1b4b;padding:40px 32px;text-align:center;">
<h1 style="margin:0 0 8px 0;font-size:32px;color:#ffffff;font-weight:700;">Daily Digest</h1>
<p style="margin:0;color:#c7d2fe;font-size:15px;">{date}</p>
</div>
<div style="padding:32px;">
{intro_block}
<p style="color:#6b7280;font-size:13px;margin-bottom:24px;">{total} articles &middot; {categories} categories &middot; {ideas} with content ideas</p>
{sections}
</div>
<div style="background:#f9fafb;padding:32px;text-align:center;border-top:1px solid #e5e7eb;">
<p style="margin:0;color:#6b7280;font-size:13px;">Generated by Daily Digest</p>
</div>
</div>
</div>
</body>
</html>"#,
        date = date.format("%A, %B %-d, %Y"),
        intro_block = intro_block,
        total = articles.len(),
        categories = grouped.len(),
        ideas = with_angles,
        sections = sections,
    )
}

/// Plain-text alternative with the same grouping.
pub fn render_text(articles: &[EnrichedArticle], intro: &str, date: DateTime<Utc>) -> String {
    let grouped = group_by_category(articles);

    let mut text = format!("DAILY DIGEST\n{}\n\n", date.format("%A, %B %-d, %Y"));

    if !intro.is_empty() {
        text.push_str(&format!("TODAY'S OVERVIEW\n{}\n{}\n\n", "-".repeat(40), intro));
    }

    text.push_str(&format!(
        "Found {} articles across {} categories.\n\n{}\n\n",
        articles.len(),
        grouped.len(),
        "=".repeat(50)
    ));

    for (category, group) in &grouped {
        text.push_str(&format!("{}\n{}\n\n", category.label().to_uppercase(), "-".repeat(40)));

        for article in group {
            text.push_str(&format!(
                "* {}\n  {} - {}\n  {}\n\n",
                article.article.title,
                article.article.source_name,
                article.article.published_at.format("%Y-%m-%d"),
                article.article.url
            ));

            if !article.briefing.is_empty() {
                text.push_str(&format!("  {}\n\n", article.briefing));
            } else if !article.summary.is_empty() {
                text.push_str(&format!("  {}\n\n", article.summary));
            }

            if !article.content_angles.is_empty() {
                text.push_str("  Content ideas:\n");
                for angle in &article.content_angles {
                    text.push_str(&format!("    -> {}\n", angle));
                }
                text.push('\n');
            }
        }
    }

    text.push_str(&format!("{}\nGenerated by Daily Digest\n", "=".repeat(50)));
    text
}
