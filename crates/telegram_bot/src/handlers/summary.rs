use engine::Ledger;
use teloxide::{prelude::*, types::MessageId};

use crate::{ConfigParameters, ui};

use super::close_keyboard;

/// Shows the balances and the suggested transfers, asking whether the
/// expenses should be cleared.
pub(super) async fn summary(
    bot: &Bot,
    msg: &Message,
    cfg: &ConfigParameters,
) -> ResponseResult<()> {
    let ledger = cfg.store.get_or_create(msg.chat.id.0, Ledger::new);
    if ledger.is_empty() {
        bot.send_message(msg.chat.id, ui::NO_EXPENSES).await?;
        return Ok(());
    }

    let balances = ledger.list_balances();
    let transfers = ledger.settle(false);
    let (text, kb) = ui::render_summary(&balances, &transfers);
    bot.send_message(msg.chat.id, text).reply_markup(kb).await?;
    Ok(())
}

pub(super) async fn settle(
    bot: &Bot,
    msg: &Message,
    cfg: &ConfigParameters,
) -> ResponseResult<()> {
    let ledger = cfg.store.get_or_create(msg.chat.id.0, Ledger::new);
    if ledger.is_empty() {
        bot.send_message(msg.chat.id, ui::NO_EXPENSES).await?;
        return Ok(());
    }

    let transfers = ledger.settle(true);
    tracing::debug!(
        "chat {}: settled with {} transfers",
        msg.chat.id,
        transfers.len()
    );
    bot.send_message(msg.chat.id, ui::render_transfers(&transfers))
        .await?;
    bot.send_message(msg.chat.id, ui::CLEARED).await?;
    Ok(())
}

pub(super) async fn clean(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    cfg: &ConfigParameters,
) -> ResponseResult<()> {
    if let Some(ledger) = cfg.store.get(chat_id.0) {
        ledger.clean();
    }
    close_keyboard(bot, chat_id, message_id).await;
    bot.send_message(chat_id, ui::CLEARED).await?;
    Ok(())
}
