use engine::{ExpenseId, parse_amount};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ExpenseDraft {
    pub payer: Option<String>,
    pub participants: Vec<String>,
    pub amount: f64,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("importo non valido")]
    InvalidAmount,
    #[error("nessun partecipante indicato")]
    NoParticipants,
    #[error("chi ha pagato?")]
    MissingPayer,
    #[error("id non valido")]
    InvalidId,
}

/// Splits a participants list separated by spaces and/or commas.
fn split_names(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn amount_and_participants(input: &str) -> Result<(f64, Vec<String>), ParseError> {
    let trimmed = input.trim();
    let (amount_str, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
    let amount = parse_amount(amount_str).map_err(|_| ParseError::InvalidAmount)?;

    let participants = split_names(rest);
    if participants.is_empty() {
        return Err(ParseError::NoParticipants);
    }
    Ok((amount, participants))
}

/// Parses the arguments of `/add`: `<amount> <participants…>`.
///
/// The payer is the sender, so it is left empty here.
pub(crate) fn parse_add(input: &str) -> Result<ExpenseDraft, ParseError> {
    let (amount, participants) = amount_and_participants(input)?;
    Ok(ExpenseDraft {
        payer: None,
        participants,
        amount,
    })
}

/// Parses the arguments of `/addfor`: `<payer> <amount> <participants…>`.
pub(crate) fn parse_add_for(input: &str) -> Result<ExpenseDraft, ParseError> {
    let trimmed = input.trim();
    let Some((payer, rest)) = trimmed.split_once(char::is_whitespace) else {
        return Err(if trimmed.is_empty() {
            ParseError::MissingPayer
        } else {
            ParseError::InvalidAmount
        });
    };
    let payer = payer.trim_end_matches(',');
    if payer.is_empty() {
        return Err(ParseError::MissingPayer);
    }

    let (amount, participants) = amount_and_participants(rest)?;
    Ok(ExpenseDraft {
        payer: Some(payer.to_string()),
        participants,
        amount,
    })
}

pub(crate) fn parse_expense_id(input: &str) -> Result<ExpenseId, ParseError> {
    input
        .trim()
        .trim_start_matches('#')
        .parse::<ExpenseId>()
        .map_err(|_| ParseError::InvalidId)
}
