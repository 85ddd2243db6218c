use teloxide::prelude::*;
use teloxide::types::ChatAction;

use super::util::{caller_id, send_reply};
use super::AppState;
use crate::intent::{classify, Intent};

pub async fn handle_text(bot: Bot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    // Skip commands
    if text.starts_with('/') {
        return Ok(());
    }

    // Access control
    if !state.check_access(&msg) {
        bot.send_message(msg.chat.id, "Sorry, you are not authorized to use this bot.")
            .await?;
        return Ok(());
    }

    let caller = caller_id(&msg);

    if classify(&text) != Intent::Greeting {
        let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;
    }

    let reply = state.responder.respond(caller, &text).await;
    tracing::debug!(caller, reply_len = reply.len(), "Replying");

    send_reply(&bot, msg.chat.id, &reply).await
}
