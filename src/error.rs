use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure of a single remote invocation, classified so the retry loop can
/// decide whether to try again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("rate limited by remote service")]
    RateLimited,

    #[error("remote service rejected credentials")]
    Unauthorized,

    #[error("remote service rejected the request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::RateLimited)
    }

    /// Classify an HTTP error response. The status code decides when it is
    /// conclusive; the body text is only consulted otherwise.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => RemoteError::RateLimited,
            401 | 403 => RemoteError::Unauthorized,
            400 | 404 | 422 => {
                if looks_rate_limited(body) {
                    RemoteError::RateLimited
                } else {
                    RemoteError::InvalidRequest(body.to_string())
                }
            }
            _ => Self::from_text(&format!("status {status}: {body}")),
        }
    }

    /// Last-resort classification when no status code is available.
    pub fn from_text(text: &str) -> Self {
        if looks_rate_limited(text) {
            RemoteError::RateLimited
        } else {
            RemoteError::Other(text.to_string())
        }
    }
}

fn looks_rate_limited(text: &str) -> bool {
    static RATE_LIMITED: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(r"(?i)\b429\b|quota|resource[_ ]exhausted|rate[_ ]?limit").unwrap()
    });
    RATE_LIMITED.is_match(text)
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RemoteError::from_status(status.as_u16(), &e.to_string()),
            None => RemoteError::from_text(&e.to_string()),
        }
    }
}
