mod bot;
mod config;
mod error;
mod gemini;
mod health;
mod intent;
mod news;
mod rate_limiter;
mod responder;
mod retry;

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::gemini::{CompletionService, GeminiClient};
use crate::news::{HeadlineService, NewsApiClient};
use crate::rate_limiter::RateLimiter;
use crate::responder::Responder;
use crate::retry::RetryPolicy;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Gemini news bot starting...");

    // Load configuration
    let config = config::load_config()?;
    tracing::info!(
        transport = %config.transport,
        cooldown_ms = config.rate_limit_cooldown_ms,
        max_attempts = config.max_retry_attempts,
        "Configuration loaded"
    );

    let completion: Arc<dyn CompletionService> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    )?);

    let headlines: Option<Arc<dyn HeadlineService>> = match &config.news_api_key {
        Some(key) => {
            let client: Arc<dyn HeadlineService> = Arc::new(NewsApiClient::new(key.clone())?);
            Some(client)
        }
        None => {
            tracing::warn!("NEWS_API_KEY not set, news requests will be declined");
            None
        }
    };

    let limiter = Arc::new(Mutex::new(RateLimiter::new(Duration::from_millis(
        config.rate_limit_cooldown_ms,
    ))));
    let policy = RetryPolicy {
        max_attempts: config.max_retry_attempts,
        attempt_timeout: Duration::from_millis(config.remote_timeout_ms),
    };
    let responder = Responder::new(
        limiter,
        completion,
        headlines,
        policy,
        config.max_concurrent_requests,
    );

    // Health server for the hosting platform
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            tracing::error!("Health server stopped: {e}");
        }
    });

    let bot = Bot::new(&config.bot_token);
    let state = bot::AppState::new(config, responder);

    // Register commands with Telegram
    if let Err(e) = bot
        .set_my_commands(bot::commands::BotCommand::bot_commands())
        .await
    {
        tracing::warn!("Failed to set bot commands: {e}");
    }

    tracing::info!("Bot starting...");

    bot::build_and_run(bot, state).await
}
