//! AI completion backed by the Gemini `generateContent` REST endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, RemoteError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// One prompt in, one reply out. Implementations perform exactly one remote
/// invocation per call; retrying is the caller's business.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, RemoteError>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn parse_generate_response(body: &str) -> Result<String, RemoteError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::Other(format!("unreadable Gemini response: {e}")))?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(RemoteError::Other("Gemini returned no candidates".into()));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(RemoteError::Other(format!(
            "Gemini returned an empty reply (finish reason: {reason})"
        )));
    }
    Ok(text)
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, RemoteError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        if status != 200 {
            tracing::debug!(status, body = %text, "Gemini error response");
            return Err(RemoteError::from_status(status, &text));
        }
        parse_generate_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_text_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":", world"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(parse_generate_response(body), Ok("Hello, world".to_string()));
    }

    #[test]
    fn test_parse_no_candidates() {
        let err = parse_generate_response(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Other(ref m) if m.contains("no candidates")));
    }

    #[test]
    fn test_parse_blocked_reply_reports_reason() {
        let body = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let err = parse_generate_response(body).unwrap_err();
        assert!(matches!(err, RemoteError::Other(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_generate_response("<html>"),
            Err(RemoteError::Other(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: "hi there" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi there");
        assert_eq!(json["contents"][0]["role"], "user");
    }
}
