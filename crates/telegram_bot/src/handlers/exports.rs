//! Handlers that move expenses in and out of a chat as csv files

use engine::{EngineError, Ledger, Transaction, export_csv, import_csv};
use teloxide::{
    net::Download,
    prelude::*,
    types::{Document, InputFile, MessageId},
};

use crate::{ConfigParameters, ui};

use super::close_keyboard;

/// Larger files are refused before being downloaded.
const MAX_IMPORT_SIZE: u32 = 1024 * 1024;
const EXPORT_FILE_NAME: &str = "expenses.csv";

pub(super) async fn export(bot: &Bot, msg: &Message, cfg: &ConfigParameters) -> ResponseResult<()> {
    let ledger = cfg.store.get_or_create(msg.chat.id.0, Ledger::new);
    let expenses: Vec<_> = ledger
        .list_expenses()
        .into_iter()
        .map(|(_, tx)| tx)
        .collect();
    if expenses.is_empty() {
        bot.send_message(msg.chat.id, ui::NO_EXPENSES).await?;
        return Ok(());
    }

    let data = match export_csv(&expenses) {
        Ok(data) => data,
        Err(err) => {
            tracing::error!("chat {}: failed to export expenses: {err}", msg.chat.id);
            bot.send_message(msg.chat.id, "Errore durante l'esportazione.")
                .await?;
            return Ok(());
        }
    };

    bot.send_document(msg.chat.id, InputFile::memory(data).file_name(EXPORT_FILE_NAME))
        .await?;
    Ok(())
}

/// Reads a csv document. An empty chat is filled right away, otherwise the
/// expenses are parked until the user confirms the replacement.
pub(super) async fn import(
    bot: &Bot,
    msg: &Message,
    cfg: &ConfigParameters,
    document: &Document,
) -> ResponseResult<()> {
    if document.file.size > MAX_IMPORT_SIZE {
        bot.send_message(msg.chat.id, "Il file è troppo grande 😕 (massimo 1 MB).")
            .await?;
        return Ok(());
    }

    let file = bot.get_file(document.file.id.clone()).await?;
    let mut data = Vec::with_capacity(file.size as usize);
    bot.download_file(&file.path, &mut data).await?;

    let expenses = match import_csv(&data) {
        Ok(expenses) => expenses,
        Err(err @ EngineError::InvalidRecord { .. }) => {
            bot.send_message(msg.chat.id, format!("File non valido 😕: {err}."))
                .await?;
            return Ok(());
        }
        Err(err) => {
            tracing::warn!("chat {}: unreadable csv: {err}", msg.chat.id);
            bot.send_message(msg.chat.id, "File non valido 😕: non è un csv leggibile.")
                .await?;
            return Ok(());
        }
    };

    let ledger = cfg.store.get_or_create(msg.chat.id.0, Ledger::new);
    if ledger.is_empty() {
        return replace(bot, msg.chat.id, &ledger, expenses).await;
    }

    let (text, kb) = ui::render_import_confirm(expenses.len(), ledger.len());
    cfg.pending.park(msg.chat.id, expenses).await;
    bot.send_message(msg.chat.id, text).reply_markup(kb).await?;
    Ok(())
}

pub(super) async fn confirm_import(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    cfg: &ConfigParameters,
) -> ResponseResult<()> {
    close_keyboard(bot, chat_id, message_id).await;

    let Some(expenses) = cfg.pending.take(chat_id).await else {
        bot.send_message(chat_id, "Nessuna importazione in attesa.")
            .await?;
        return Ok(());
    };

    let ledger = cfg.store.get_or_create(chat_id.0, Ledger::new);
    replace(bot, chat_id, &ledger, expenses).await
}

async fn replace(
    bot: &Bot,
    chat_id: ChatId,
    ledger: &Ledger,
    expenses: Vec<Transaction>,
) -> ResponseResult<()> {
    let text = match ledger.replace_expenses(expenses) {
        Ok(count) => {
            tracing::info!("chat {chat_id}: imported {count} expenses");
            ui::render_imported(count)
        }
        Err(err) => format!("Importazione annullata 😕: {err}."),
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}
