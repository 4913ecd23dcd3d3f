use std::collections::BTreeMap;

use engine::{ExpenseId, Transaction, format_amount, is_settled};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

const BUTTONS_PER_ROW: usize = 5;

pub(crate) const NO_EXPENSES: &str =
    "Non ci sono ancora spese 😕. Usa /add o /addfor per aggiungerne una.";
pub(crate) const EXPIRED: &str =
    "⌛ La sessione è scaduta per inattività: le spese di questa chat sono state eliminate.";
pub(crate) const CLEARED: &str = "🎉 Ok, la lista delle spese è stata azzerata.";
pub(crate) const IMPORT_HINT: &str =
    "Invia il file csv come documento con didascalia /import.\nFormato: pagatore,partecipante1;partecipante2,importo";
pub(crate) const INTERNAL_ERROR: &str = "☠️ Errore interno, riprova più tardi.";

pub(crate) fn welcome_text() -> String {
    "👋🏻 Ciao! Tengo il conto delle spese condivise di questa chat e suggerisco \
     chi deve pagare chi per andare in pari.\nUsa /help per vedere i comandi."
        .to_string()
}

pub(crate) fn render_added(id: ExpenseId, tx: &Transaction) -> String {
    format!(
        "✅ #{id}: {} ha pagato {} per {}.",
        tx.payer,
        format_amount(tx.amount),
        tx.participants.join(", ")
    )
}

pub(crate) fn render_expenses(
    expenses: &[(ExpenseId, Transaction)],
) -> (String, InlineKeyboardMarkup) {
    let mut text = String::from("Spese correnti 💸:");
    for (id, tx) in expenses {
        text.push_str(&format!(
            "\n {id}. {} ha pagato {} per {}",
            tx.payer,
            format_amount(tx.amount),
            tx.participants.join(", ")
        ));
    }
    text.push_str("\n\nTocca un id per eliminare la spesa.");

    let mut rows: Vec<Vec<InlineKeyboardButton>> = expenses
        .chunks(BUTTONS_PER_ROW)
        .map(|chunk| {
            chunk
                .iter()
                .map(|(id, _)| InlineKeyboardButton::callback(format!("🗑 {id}"), format!("rm:{id}")))
                .collect()
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("❌ Chiudi", "nav:close")]);

    (text, InlineKeyboardMarkup::new(rows))
}

pub(crate) fn render_transfers(transfers: &[Transaction]) -> String {
    if transfers.is_empty() {
        return "Siete tutti in pari 🤝".to_string();
    }
    let mut text = String::from("Pagamenti suggeriti 🔄:");
    for tx in transfers {
        text.push_str(&format!(
            "\n - {} deve dare {} a {}",
            tx.payer,
            format_amount(tx.amount),
            tx.creditor().unwrap_or("?")
        ));
    }
    text
}

pub(crate) fn render_summary(
    balances: &BTreeMap<String, f64>,
    transfers: &[Transaction],
) -> (String, InlineKeyboardMarkup) {
    let mut text = String::from("Saldi dei partecipanti 💰:");
    for (participant, balance) in balances.iter().filter(|(_, b)| !is_settled(**b)) {
        let sign = if *balance > 0.0 { "+" } else { "" };
        text.push_str(&format!(
            "\n - {participant}: {sign}{}",
            format_amount(*balance)
        ));
    }
    text.push_str("\n\n");
    text.push_str(&render_transfers(transfers));
    text.push_str("\n\nVuoi azzerare la lista delle spese? 🗑️");

    let kb = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Sì, azzera", "summary:clean"),
        InlineKeyboardButton::callback("❌ No", "nav:close"),
    ]]);

    (text, kb)
}

pub(crate) fn render_import_confirm(count: usize, current: usize) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "Il file contiene {count} spese ma la chat ne ha già {current}. \
         Vuoi sostituirle? Le spese attuali verranno eliminate."
    );
    let kb = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Sostituisci", "import:confirm"),
        InlineKeyboardButton::callback("❌ Annulla", "import:cancel"),
    ]]);
    (text, kb)
}

pub(crate) fn render_imported(count: usize) -> String {
    format!("🎉 Importate {count} spese.")
}
