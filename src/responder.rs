//! Routes inbound text to a greeting, a news lookup or an AI completion,
//! gating the remote paths behind the per-caller cooldown and the retry loop.

use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

use crate::gemini::CompletionService;
use crate::intent::{classify, Intent};
use crate::news::{format_headlines, HeadlineService};
use crate::rate_limiter::RateLimiter;
use crate::retry::{call_with_retry, RetryPolicy};

pub const WELCOME_TEXT: &str = "\u{1f44b} Hey! I'm connected to Gemini AI and I follow tech news.\n\n\
    \u{1f539} Try sending anything like:\n\
    What is Rust?\n\
    Tell me a joke\n\
    latest news\n\n\
    Type /help for all commands. Let's go! \u{1f680}";

pub const NEWS_UNAVAILABLE: &str = "\u{1f6a7} News isn't configured on this bot yet.";

pub struct Responder {
    limiter: Arc<Mutex<RateLimiter>>,
    completion: Arc<dyn CompletionService>,
    headlines: Option<Arc<dyn HeadlineService>>,
    policy: RetryPolicy,
    permits: Arc<Semaphore>,
}

impl Responder {
    pub fn new(
        limiter: Arc<Mutex<RateLimiter>>,
        completion: Arc<dyn CompletionService>,
        headlines: Option<Arc<dyn HeadlineService>>,
        policy: RetryPolicy,
        max_concurrent: usize,
    ) -> Self {
        Self {
            limiter,
            completion,
            headlines,
            policy,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Always yields text for the user: real content, a cooldown notice or
    /// an apology.
    pub async fn respond(&self, caller_id: i64, text: &str) -> String {
        match classify(text) {
            Intent::Greeting => WELCOME_TEXT.to_string(),
            Intent::News => self.news(caller_id).await,
            Intent::General => self.complete(caller_id, text).await,
        }
    }

    pub async fn news(&self, caller_id: i64) -> String {
        if let Some(wait) = self.cooldown_notice(caller_id).await {
            return wait;
        }

        let Some(service) = self.headlines.as_ref() else {
            return NEWS_UNAVAILABLE.to_string();
        };

        let permits = &self.permits;
        let result = call_with_retry(
            move || async move {
                // Held for the remote call only, never across a backoff sleep
                let _permit = permits.acquire().await.ok();
                service.top_headlines().await.map(|h| format_headlines(&h))
            },
            &self.policy,
        )
        .await;

        result.unwrap_or_else(|e| {
            tracing::error!(caller_id, error = %e, "News lookup failed");
            e.user_message()
        })
    }

    async fn complete(&self, caller_id: i64, prompt: &str) -> String {
        if let Some(wait) = self.cooldown_notice(caller_id).await {
            return wait;
        }

        let permits = &self.permits;
        let completion = &self.completion;
        let result = call_with_retry(
            move || async move {
                let _permit = permits.acquire().await.ok();
                completion.complete(prompt).await
            },
            &self.policy,
        )
        .await;

        result.unwrap_or_else(|e| {
            tracing::error!(caller_id, error = %e, "Completion failed");
            e.user_message()
        })
    }

    async fn cooldown_notice(&self, caller_id: i64) -> Option<String> {
        let now = Instant::now();
        let wait = {
            let mut limiter = self.limiter.lock().await;
            if limiter.is_allowed(caller_id, now) {
                tracing::debug!(caller_id, tracked = limiter.tracked_callers(), "Caller admitted");
                return None;
            }
            limiter.retry_after(caller_id, now).unwrap_or_default()
        };

        let secs = (wait.as_millis() as u64).div_ceil(1000);
        tracing::debug!(caller_id, secs, "Caller in cooldown");
        Some(format!(
            "\u{23f3} Please wait {secs}s before sending another message."
        ))
    }
}
