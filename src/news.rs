//! Technology headlines from NewsAPI.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{BotError, RemoteError};

const NEWS_API_URL: &str = "https://newsapi.org/v2/top-headlines";
const CONNECT_TIMEOUT_SECS: u64 = 10;
pub const MAX_HEADLINES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub title: String,
    pub link: String,
    pub source: String,
}

#[async_trait]
pub trait HeadlineService: Send + Sync {
    /// At most `MAX_HEADLINES`, in the order the service ranked them.
    async fn top_headlines(&self) -> Result<Vec<Headline>, RemoteError>;
}

pub struct NewsApiClient {
    http: reqwest::Client,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            // NewsAPI rejects requests without a user agent
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, api_key })
    }
}

#[derive(Deserialize)]
struct TopHeadlinesResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct Article {
    title: Option<String>,
    url: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

fn parse_top_headlines(body: &str) -> Result<Vec<Headline>, RemoteError> {
    let parsed: TopHeadlinesResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::Other(format!("unreadable news response: {e}")))?;

    if parsed.status != "ok" {
        let message = parsed.message.unwrap_or_else(|| parsed.status.clone());
        return Err(RemoteError::from_text(&message));
    }

    Ok(parsed
        .articles
        .into_iter()
        .filter_map(|a| {
            Some(Headline {
                title: a.title?,
                link: a.url?,
                source: a
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .take(MAX_HEADLINES)
        .collect())
}

#[async_trait]
impl HeadlineService for NewsApiClient {
    async fn top_headlines(&self) -> Result<Vec<Headline>, RemoteError> {
        let page_size = MAX_HEADLINES.to_string();
        let response = self
            .http
            .get(NEWS_API_URL)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("category", "technology"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        if status != 200 {
            tracing::debug!(status, body = %text, "NewsAPI error response");
            return Err(RemoteError::from_status(status, &text));
        }
        parse_top_headlines(&text)
    }
}

pub fn format_headlines(headlines: &[Headline]) -> String {
    if headlines.is_empty() {
        return "No headlines right now.".to_string();
    }

    let mut out = String::from("\u{1f4f0} Latest tech headlines\n");
    for (i, h) in headlines.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {}\n   {} \u{2014} {}",
            i + 1,
            h.title,
            h.source,
            h.link
        ));
    }
    out
}
