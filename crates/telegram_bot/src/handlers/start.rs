//! Handlers for /start and /help

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{commands::Command, ui};

pub(super) async fn start(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, ui::welcome_text()).await?;
    Ok(())
}

pub(super) async fn help(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}
