use teloxide::prelude::*;
use teloxide::types::ChatAction;
use teloxide::utils::command::BotCommands;

use super::util::{caller_id, send_reply};
use super::AppState;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum BotCommand {
    #[command(description = "Welcome & quick start")]
    Start,
    #[command(description = "Show all commands")]
    Help,
    #[command(description = "Latest tech headlines")]
    News,
    #[command(description = "Say goodbye")]
    Stop,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    state: AppState,
) -> anyhow::Result<()> {
    // Access control
    if !state.check_access(&msg) {
        bot.send_message(msg.chat.id, "Sorry, you are not authorized to use this bot.")
            .await?;
        return Ok(());
    }

    match cmd {
        BotCommand::Start => handle_start(bot, msg).await,
        BotCommand::Help => handle_help(bot, msg).await,
        BotCommand::News => handle_news(bot, msg, state).await,
        BotCommand::Stop => handle_stop(bot, msg).await,
    }
}

fn welcome_text(first_name: &str) -> String {
    format!(
        "\u{1f680} Hello {first_name}!\n\n\
        \u{1f916} Gemini Telegram Bot is alive and ready!\n\n\
        Commands:\n\
        /start - Show this message\n\
        /news - Get latest tech headlines\n\
        /help - Show help\n\
        /stop - Say goodbye\n\n\
        Just send me any message and I'll respond with Gemini AI!"
    )
}

async fn handle_start(bot: Bot, msg: Message) -> anyhow::Result<()> {
    let first_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_else(|| "there".to_string());

    bot.send_message(msg.chat.id, welcome_text(&first_name))
        .await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(
        msg.chat.id,
        "\u{1f198} Help & Commands\n\n\
        \u{2022} /start - Welcome message\n\
        \u{2022} /news - Latest tech headlines\n\
        \u{2022} /help - Show this help\n\
        \u{2022} /stop - Say goodbye\n\n\
        \u{1f4ac} Type any message and I'll respond using Gemini AI!\n\
        \u{1f4f0} Messages mentioning news or headlines fetch the top stories.\n\
        \u{23f3} One request every few seconds per user, please.",
    )
    .await?;
    Ok(())
}

async fn handle_news(bot: Bot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

    let reply = state.responder.news(caller_id(&msg)).await;
    send_reply(&bot, msg.chat.id, &reply).await
}

async fn handle_stop(bot: Bot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(
        msg.chat.id,
        "\u{1f64f} Thank you for chatting with me!\n\
        Hope I helped you today \u{1f31f}\n\
        You can come back anytime by typing /start \u{1f4ac}\n\n\
        Have a great day ahead! \u{1f308}",
    )
    .await?;
    Ok(())
}
