//! CSV exchange of expenses.
//!
//! One headerless row per expense:
//!
//! ```text
//! @alice,@bob;@carol,30.00
//! ```

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::{EngineError, ResultEngine, Transaction, amount::parse_amount};

const PARTICIPANTS_SEPARATOR: &str = ";";

/// Writes `expenses` as CSV rows, amounts with two decimals.
pub fn export_csv(expenses: &[Transaction]) -> ResultEngine<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    for tx in expenses {
        writer.write_record([
            tx.payer.as_str(),
            tx.participants.join(PARTICIPANTS_SEPARATOR).as_str(),
            format!("{:.2}", tx.amount).as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| EngineError::Csv(err.into_error().into()))
}

/// Parses CSV rows into expenses. Any invalid row rejects the whole file.
pub fn import_csv(data: &[u8]) -> ResultEngine<Vec<Transaction>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let mut expenses = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |pos| pos.line());
        let invalid = |reason: &str| EngineError::InvalidRecord {
            line,
            reason: reason.to_string(),
        };

        if record.len() != 3 {
            return Err(invalid("expected payer, participants and amount"));
        }
        let payer = &record[0];
        if payer.is_empty() {
            return Err(invalid("missing payer"));
        }
        let participants: Vec<String> = record[1]
            .split(PARTICIPANTS_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
            .collect();
        if participants.is_empty() {
            return Err(invalid("missing participants"));
        }
        let amount = parse_amount(&record[2]).map_err(|err| invalid(&err.to_string()))?;

        expenses.push(Transaction::new(payer, participants, amount));
    }

    Ok(expenses)
}
