//! Greedy debt minimization.
//!
//! Every round matches the largest creditor with the largest debtor and moves
//! the smaller of the two amounts. One of them ends up at exactly zero, so
//! the loop runs at most `participants - 1` times. The result is not
//! guaranteed to use the minimum number of transfers.

use std::collections::BTreeMap;

use crate::{Transaction, amount::EPSILON};

/// Computes the transfers that bring every balance to zero.
///
/// Works on a copy: `balances` is left untouched. Ties between equal
/// balances go to the identifier that sorts first.
pub fn settle_balances(balances: &BTreeMap<String, f64>) -> Vec<Transaction> {
    let mut working = balances.clone();
    let mut result = Vec::new();

    loop {
        let mut max_creditor: Option<&String> = None;
        let mut max_debtor: Option<&String> = None;
        let mut max_amount: f64 = 0.0;
        let mut min_amount: f64 = 0.0;

        for (person, &balance) in &working {
            if balance > max_amount {
                max_creditor = Some(person);
                max_amount = balance;
            }
            if balance < min_amount {
                max_debtor = Some(person);
                min_amount = balance;
            }
        }

        let (Some(creditor), Some(debtor)) = (max_creditor.cloned(), max_debtor.cloned()) else {
            break;
        };
        if max_amount <= EPSILON && min_amount.abs() <= EPSILON {
            break;
        }

        let settle_amount = f64::min(max_amount, min_amount.abs());
        if let Some(balance) = working.get_mut(&creditor) {
            *balance -= settle_amount;
        }
        if let Some(balance) = working.get_mut(&debtor) {
            *balance += settle_amount;
        }

        result.push(Transaction::transfer(debtor, creditor, settle_amount));
    }

    result
}
