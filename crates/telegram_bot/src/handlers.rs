use teloxide::{
    prelude::*,
    types::{CallbackQuery, MessageId, User},
};

use crate::{ConfigParameters, commands::Command, ui};

mod expenses;
mod exports;
mod start;
mod summary;

pub(crate) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    match cmd {
        Command::Start => start::start(&bot, &msg).await,
        Command::Help => start::help(&bot, &msg).await,
        Command::Add { args } => expenses::add(&bot, &msg, &cfg, &args).await,
        Command::AddFor { args } => expenses::add_for(&bot, &msg, &cfg, &args).await,
        Command::Expenses => expenses::list(&bot, &msg, &cfg).await,
        Command::Remove { args } => expenses::remove(&bot, &msg, &cfg, &args).await,
        Command::Summary => summary::summary(&bot, &msg, &cfg).await,
        Command::Settle => summary::settle(&bot, &msg, &cfg).await,
        Command::Export => exports::export(&bot, &msg, &cfg).await,
        Command::Import => {
            bot.send_message(msg.chat.id, ui::IMPORT_HINT).await?;
            Ok(())
        }
    }
}

/// Messages that are not commands: only a csv document captioned `/import`
/// is meaningful.
pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    let Some(document) = msg.document() else {
        return Ok(());
    };
    let is_import = msg
        .caption()
        .is_some_and(|caption| caption.trim_start().starts_with("/import"));
    if !is_import {
        return Ok(());
    }

    exports::import(&bot, &msg, &cfg, document).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    if data == "nav:close" {
        close_keyboard(&bot, chat_id, message_id).await;
    } else if let Some(raw_id) = data.strip_prefix("rm:") {
        expenses::remove_from_keyboard(&bot, chat_id, message_id, &cfg, raw_id).await?;
    } else if data == "summary:clean" {
        summary::clean(&bot, chat_id, message_id, &cfg).await?;
    } else if data == "import:confirm" {
        exports::confirm_import(&bot, chat_id, message_id, &cfg).await?;
    } else if data == "import:cancel" {
        cfg.pending.take(chat_id).await;
        close_keyboard(&bot, chat_id, message_id).await;
    } else {
        tracing::warn!("unknown callback data: {data}");
    }

    Ok(())
}

/// Removes the inline keyboard of a message, ignoring failures (the message
/// may be too old to be edited).
async fn close_keyboard(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    if let Err(err) = bot.edit_message_reply_markup(chat_id, message_id).await {
        tracing::debug!("failed to remove keyboard: {err}");
    }
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}

/// How a Telegram user is named inside a ledger: `@username` when available,
/// the first name otherwise.
fn participant_handle(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{username}"),
        None => user.first_name.clone(),
    }
}
