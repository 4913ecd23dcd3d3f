//! Handlers that add, list and remove expenses

use engine::{EngineError, Ledger, Transaction};
use teloxide::{prelude::*, types::MessageId};

use crate::{
    ConfigParameters,
    parsing::{ExpenseDraft, parse_add, parse_add_for, parse_expense_id},
    ui,
};

use super::participant_handle;

const ADD_USAGE: &str = "Formato: /add 12.50 @partecipante1 @partecipante2";
const ADD_FOR_USAGE: &str = "Formato: /addfor @pagatore 12.50 @partecipante1 @partecipante2";
const REMOVE_USAGE: &str = "Formato: /remove 3 (vedi /expenses per gli id)";

pub(super) async fn add(
    bot: &Bot,
    msg: &Message,
    cfg: &ConfigParameters,
    args: &str,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        bot.send_message(msg.chat.id, "Impossibile identificare l'utente.")
            .await?;
        return Ok(());
    };

    match parse_add(args) {
        Ok(draft) => record(bot, msg.chat.id, cfg, participant_handle(from), draft).await,
        Err(err) => {
            bot.send_message(msg.chat.id, format!("Non ho capito 😕: {err}.\n{ADD_USAGE}"))
                .await?;
            Ok(())
        }
    }
}

pub(super) async fn add_for(
    bot: &Bot,
    msg: &Message,
    cfg: &ConfigParameters,
    args: &str,
) -> ResponseResult<()> {
    match parse_add_for(args) {
        Ok(ExpenseDraft {
            payer: Some(payer),
            participants,
            amount,
        }) => {
            let draft = ExpenseDraft {
                payer: None,
                participants,
                amount,
            };
            record(bot, msg.chat.id, cfg, payer, draft).await
        }
        Ok(_) => {
            bot.send_message(msg.chat.id, ADD_FOR_USAGE).await?;
            Ok(())
        }
        Err(err) => {
            bot.send_message(
                msg.chat.id,
                format!("Non ho capito 😕: {err}.\n{ADD_FOR_USAGE}"),
            )
            .await?;
            Ok(())
        }
    }
}

async fn record(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    payer: String,
    draft: ExpenseDraft,
) -> ResponseResult<()> {
    let ledger = cfg.store.get_or_create(chat_id.0, Ledger::new);
    let tx = Transaction::new(payer, draft.participants, draft.amount);

    let text = match ledger.add_expense(tx.payer.clone(), tx.participants.clone(), tx.amount) {
        Ok(id) => {
            tracing::debug!("chat {chat_id}: added expense {id}");
            ui::render_added(id, &tx)
        }
        Err(err @ (EngineError::EmptyParticipants | EngineError::InvalidAmount(_))) => {
            format!("Spesa non valida 😕: {err}")
        }
        Err(err) => {
            tracing::error!("chat {chat_id}: failed to add expense: {err}");
            ui::INTERNAL_ERROR.to_string()
        }
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}

pub(super) async fn list(bot: &Bot, msg: &Message, cfg: &ConfigParameters) -> ResponseResult<()> {
    let ledger = cfg.store.get_or_create(msg.chat.id.0, Ledger::new);
    let expenses = ledger.list_expenses();
    if expenses.is_empty() {
        bot.send_message(msg.chat.id, ui::NO_EXPENSES).await?;
        return Ok(());
    }

    let (text, kb) = ui::render_expenses(&expenses);
    bot.send_message(msg.chat.id, text).reply_markup(kb).await?;
    Ok(())
}

pub(super) async fn remove(
    bot: &Bot,
    msg: &Message,
    cfg: &ConfigParameters,
    args: &str,
) -> ResponseResult<()> {
    let id = match parse_expense_id(args) {
        Ok(id) => id,
        Err(err) => {
            bot.send_message(msg.chat.id, format!("Non ho capito 😕: {err}.\n{REMOVE_USAGE}"))
                .await?;
            return Ok(());
        }
    };

    let ledger = cfg.store.get_or_create(msg.chat.id.0, Ledger::new);
    let text = match ledger.remove_expense(id) {
        Some(_) => format!("Ok, spesa {id} eliminata. 👍🏻"),
        None => format!("Nessuna spesa con id {id}."),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Removes the expense tapped in the `/expenses` keyboard and refreshes the
/// list in place.
pub(super) async fn remove_from_keyboard(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    cfg: &ConfigParameters,
    raw_id: &str,
) -> ResponseResult<()> {
    let Ok(id) = parse_expense_id(raw_id) else {
        tracing::warn!("invalid expense id in callback: {raw_id}");
        return Ok(());
    };

    let ledger = cfg.store.get_or_create(chat_id.0, Ledger::new);
    if ledger.remove_expense(id).is_some() {
        bot.send_message(chat_id, format!("Ok, spesa {id} eliminata. 👍🏻"))
            .await?;
    }

    let expenses = ledger.list_expenses();
    if expenses.is_empty() {
        bot.edit_message_text(chat_id, message_id, ui::NO_EXPENSES)
            .await?;
        return Ok(());
    }
    let (text, kb) = ui::render_expenses(&expenses);
    bot.edit_message_text(chat_id, message_id, text)
        .reply_markup(kb)
        .await?;
    Ok(())
}
