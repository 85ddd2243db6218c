use std::fmt;

use crate::error::BotError;

/// Backoff doubles per attempt, so this also caps the longest single wait.
const MAX_RETRY_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub news_api_key: Option<String>,
    pub allowed_users: Vec<i64>,
    pub rate_limit_cooldown_ms: u64,
    pub max_retry_attempts: u32,
    pub remote_timeout_ms: u64,
    pub max_concurrent_requests: usize,
    pub port: u16,
    pub transport: Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transport {
    Polling,
    Webhook { url: String, port: u16 },
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Polling => write!(f, "polling"),
            Transport::Webhook { url, port } => write!(f, "webhook ({url} on :{port})"),
        }
    }
}

fn required(name: &str) -> Result<String, BotError> {
    let value = std::env::var(name)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    if value.is_empty() {
        return Err(BotError::Config(format!(
            "{name} is required. Set it in .env file."
        )));
    }
    Ok(value)
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    optional(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn clamp_attempts(attempts: u32) -> u32 {
    attempts.clamp(1, MAX_RETRY_ATTEMPTS)
}

fn parse_user_list(s: &str) -> Vec<i64> {
    s.split(',')
        .filter_map(|id| id.trim().parse::<i64>().ok())
        .collect()
}

pub fn load_config() -> Result<Config, BotError> {
    dotenvy::dotenv().ok();

    let bot_token = required("BOT_TOKEN")?;
    let gemini_api_key = required("GEMINI_API_KEY")?;

    let gemini_model =
        optional("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string());

    let allowed_users = optional("ALLOWED_USERS")
        .map(|s| parse_user_list(&s))
        .unwrap_or_default();

    let transport = match optional("WEBHOOK_URL") {
        Some(url) => Transport::Webhook {
            url,
            port: parsed_or("WEBHOOK_PORT", 8443),
        },
        None => Transport::Polling,
    };

    let port = parsed_or("PORT", 5000);
    if let Transport::Webhook { port: hook_port, .. } = &transport {
        if *hook_port == port {
            return Err(BotError::Config(format!(
                "WEBHOOK_PORT and PORT must differ (both {port})"
            )));
        }
    }

    Ok(Config {
        bot_token,
        gemini_api_key,
        gemini_model,
        news_api_key: optional("NEWS_API_KEY"),
        allowed_users,
        rate_limit_cooldown_ms: parsed_or("RATE_LIMIT_COOLDOWN_MS", 5000),
        max_retry_attempts: clamp_attempts(parsed_or("MAX_RETRY_ATTEMPTS", 5)),
        remote_timeout_ms: parsed_or("REMOTE_TIMEOUT_MS", 20_000),
        max_concurrent_requests: parsed_or("MAX_CONCURRENT_REQUESTS", 16usize).max(1),
        port,
        transport,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        assert_eq!(Transport::Polling.to_string(), "polling");
        let hook = Transport::Webhook {
            url: "https://example.org/hook".into(),
            port: 8443,
        };
        assert_eq!(hook.to_string(), "webhook (https://example.org/hook on :8443)");
    }

    #[test]
    fn test_parse_user_list() {
        assert_eq!(parse_user_list("1, 2,3"), vec![1, 2, 3]);
        assert_eq!(parse_user_list("42,abc,,7"), vec![42, 7]);
        assert!(parse_user_list("").is_empty());
    }

    #[test]
    fn test_clamp_attempts() {
        assert_eq!(clamp_attempts(0), 1);
        assert_eq!(clamp_attempts(5), 5);
        assert_eq!(clamp_attempts(10), 10);
        assert_eq!(clamp_attempts(u32::MAX), MAX_RETRY_ATTEMPTS);
    }

    #[test]
    fn test_load_config_missing_token() {
        // Clear the token to test missing token error
        std::env::remove_var("BOT_TOKEN");
        let result = load_config();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }
}
