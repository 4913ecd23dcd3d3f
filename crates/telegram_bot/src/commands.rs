//! Command structs

use teloxide::utils::command::{BotCommands, ParseError};

/// Keeps everything after the command as a single argument.
pub fn rest_of_line(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_string(),))
}

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(
    rename_rule = "lowercase",
    description = "Comandi per dividere le spese del gruppo:"
)]
pub enum Command {
    #[command(description = "Messaggio di benvenuto.")]
    Start,
    #[command(description = "Mostra il seguente messaggio.")]
    Help,
    #[command(
        description = "Aggiunge una spesa pagata da te: /add 12.50 @mario @luigi",
        parse_with = rest_of_line
    )]
    Add { args: String },
    #[command(
        description = "Aggiunge una spesa pagata da un altro: /addfor @mario 12.50 @luigi @anna",
        parse_with = rest_of_line
    )]
    AddFor { args: String },
    #[command(description = "Elenca le spese e permette di eliminarle.")]
    Expenses,
    #[command(
        description = "Elimina una spesa: /remove 3",
        parse_with = rest_of_line
    )]
    Remove { args: String },
    #[command(description = "Mostra i saldi e i pagamenti suggeriti.")]
    Summary,
    #[command(description = "Mostra i pagamenti suggeriti e azzera le spese.")]
    Settle,
    #[command(description = "Esporta le spese in un file csv.")]
    Export,
    #[command(description = "Importa le spese da un file csv (inviato con didascalia /import).")]
    Import,
}
