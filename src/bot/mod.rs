pub mod commands;
pub mod handlers;
pub mod util;

use std::net::SocketAddr;
use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;

use crate::config::{Config, Transport};
use crate::responder::Responder;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub responder: Arc<Responder>,
}

impl AppState {
    pub fn new(config: Config, responder: Responder) -> Self {
        Self {
            config: Arc::new(config),
            responder: Arc::new(responder),
        }
    }

    pub fn check_access(&self, msg: &Message) -> bool {
        if self.config.allowed_users.is_empty() {
            return true;
        }
        msg.from
            .as_ref()
            .map(|user| self.config.allowed_users.contains(&(user.id.0 as i64)))
            .unwrap_or(false)
    }
}

pub async fn build_and_run(bot: Bot, state: AppState) -> anyhow::Result<()> {
    let transport = state.config.transport.clone();

    let handler = dptree::entry().branch(
        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<commands::BotCommand>()
                    .endpoint(commands::handle_command),
            )
            .branch(
                dptree::filter(|msg: Message| msg.text().is_some())
                    .endpoint(handlers::handle_text),
            ),
    );

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error while handling update",
        ))
        .enable_ctrlc_handler()
        .build();

    match transport {
        Transport::Polling => {
            tracing::info!("Receiving updates by long polling");
            dispatcher.dispatch().await;
        }
        Transport::Webhook { url, port } => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let url: reqwest::Url = url.parse()?;
            tracing::info!(%url, %addr, "Receiving updates by webhook");

            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Error from the webhook listener"),
                )
                .await;
        }
    }

    Ok(())
}
