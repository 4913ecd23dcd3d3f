//! A `Transaction` is either an expense recorded in a [`Ledger`] or a
//! transfer suggested by the settlement.
//!
//! [`Ledger`]: crate::Ledger

use serde::{Deserialize, Serialize};

/// Identifier of an expense inside a single ledger.
pub type ExpenseId = u64;

/// Who paid how much for whom.
///
/// For an expense, `participants` are charged `amount / participants.len()`
/// each; duplicates are charged once per occurrence. For a settlement
/// transfer, `participants` holds exactly the creditor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub payer: String,
    pub participants: Vec<String>,
    pub amount: f64,
}

impl Transaction {
    pub fn new(payer: impl Into<String>, participants: Vec<String>, amount: f64) -> Self {
        Self {
            payer: payer.into(),
            participants,
            amount,
        }
    }

    /// A settlement transfer: `debtor` pays `amount` to `creditor`.
    pub fn transfer(debtor: impl Into<String>, creditor: impl Into<String>, amount: f64) -> Self {
        Self {
            payer: debtor.into(),
            participants: vec![creditor.into()],
            amount,
        }
    }

    /// The creditor of a settlement transfer.
    pub fn creditor(&self) -> Option<&str> {
        self.participants.first().map(String::as_str)
    }

    /// Per-head share of the expense, `None` when nobody participates.
    pub fn share(&self) -> Option<f64> {
        if self.participants.is_empty() {
            return None;
        }
        Some(self.amount / self.participants.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_counts_duplicates() {
        let tx = Transaction::new(
            "alice",
            vec!["bob".to_string(), "bob".to_string(), "carol".to_string()],
            30.0,
        );
        assert_eq!(tx.share(), Some(10.0));
    }

    #[test]
    fn share_of_empty_expense_is_none() {
        let tx = Transaction::new("alice", Vec::new(), 30.0);
        assert_eq!(tx.share(), None);
    }

    #[test]
    fn transfer_points_to_creditor() {
        let tx = Transaction::transfer("bob", "alice", 20.0);
        assert_eq!(tx.payer, "bob");
        assert_eq!(tx.creditor(), Some("alice"));
    }
}
