//! The `Ledger` holds the expenses of one conversation and the running
//! balance of every participant.
//!
//! Balances are updated incrementally: the payer is credited the full amount
//! and every participant is debited an equal share, so the balances always
//! sum to zero. Removing an expense applies the exact opposite deltas.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    EngineError, ExpenseId, ResultEngine, Transaction, amount::ensure_valid, sessions::Exportable,
    settle::settle_balances,
};

#[derive(Debug, Default)]
struct Book {
    expenses: HashMap<ExpenseId, Transaction>,
    balances: BTreeMap<String, f64>,
    last_id: ExpenseId,
}

impl Book {
    fn add(&mut self, tx: Transaction) -> ResultEngine<ExpenseId> {
        validate(&tx)?;
        self.ensure_finite_after(&tx)?;
        self.apply(&tx, 1.0);
        self.last_id += 1;
        self.expenses.insert(self.last_id, tx);
        Ok(self.last_id)
    }

    fn remove(&mut self, id: ExpenseId) -> Option<Transaction> {
        let tx = self.expenses.remove(&id)?;
        self.apply(&tx, -1.0);
        Some(tx)
    }

    /// Applies the balance deltas of `tx`, `sign` is `1.0` to add and `-1.0`
    /// to revert.
    fn apply(&mut self, tx: &Transaction, sign: f64) {
        let share = tx.amount / tx.participants.len() as f64;
        *self.balances.entry(tx.payer.clone()).or_insert(0.0) += sign * tx.amount;
        for participant in &tx.participants {
            *self.balances.entry(participant.clone()).or_insert(0.0) -= sign * share;
        }
    }

    /// Fails if adding `tx` would push any balance out of the finite range.
    ///
    /// The deltas are accumulated in the same order as [`Book::apply`], so
    /// the checked values are exactly the ones that would be stored.
    fn ensure_finite_after(&self, tx: &Transaction) -> ResultEngine<()> {
        let share = tx.amount / tx.participants.len() as f64;
        let mut next: BTreeMap<&str, f64> = BTreeMap::new();
        let current = |name: &str| self.balances.get(name).copied().unwrap_or(0.0);

        *next.entry(&tx.payer).or_insert_with(|| current(&tx.payer)) += tx.amount;
        for participant in &tx.participants {
            *next
                .entry(participant)
                .or_insert_with(|| current(participant)) -= share;
        }

        match next.iter().find(|(_, balance)| !balance.is_finite()) {
            Some((name, _)) => Err(EngineError::InvalidAmount(format!(
                "{} would overflow the balance of {name}",
                tx.amount
            ))),
            None => Ok(()),
        }
    }

    fn sorted_expenses(&self) -> Vec<(ExpenseId, Transaction)> {
        let mut expenses: Vec<_> = self
            .expenses
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();
        expenses.sort_by_key(|(id, _)| *id);
        expenses
    }

    fn clean(&mut self) {
        self.expenses.clear();
        self.balances.clear();
        self.last_id = 0;
    }
}

fn validate(tx: &Transaction) -> ResultEngine<()> {
    if tx.participants.is_empty() {
        return Err(EngineError::EmptyParticipants);
    }
    ensure_valid(tx.amount)
}

/// Expenses and balances of a single conversation.
///
/// Every operation takes `&self` and runs under an internal lock, so two
/// tasks holding the same ledger never observe a half-applied change.
#[derive(Debug, Default)]
pub struct Ledger {
    book: Mutex<Book>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn book(&self) -> MutexGuard<'_, Book> {
        // No critical section can panic halfway through a mutation.
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records that `payer` paid `amount` for `participants` and returns the
    /// id of the new expense.
    ///
    /// Fails without touching the ledger if `participants` is empty or the
    /// amount is negative or not finite.
    pub fn add_expense(
        &self,
        payer: impl Into<String>,
        participants: Vec<String>,
        amount: f64,
    ) -> ResultEngine<ExpenseId> {
        self.book()
            .add(Transaction::new(payer, participants, amount))
    }

    /// Removes an expense and reverts its effect on the balances.
    ///
    /// Returns the removed expense, or `None` if the id is unknown.
    pub fn remove_expense(&self, id: ExpenseId) -> Option<Transaction> {
        self.book().remove(id)
    }

    /// Expenses sorted by ascending id.
    pub fn list_expenses(&self) -> Vec<(ExpenseId, Transaction)> {
        self.book().sorted_expenses()
    }

    /// A copy of the current balances.
    pub fn list_balances(&self) -> BTreeMap<String, f64> {
        self.book().balances.clone()
    }

    /// Computes the transfers that settle every balance.
    ///
    /// With `clean` the ledger is emptied in the same critical section, so no
    /// expense added concurrently can be lost between the two steps.
    pub fn settle(&self, clean: bool) -> Vec<Transaction> {
        let mut book = self.book();
        let transfers = settle_balances(&book.balances);
        if clean {
            book.clean();
        }
        transfers
    }

    /// Drops every expense and balance and restarts ids from 1.
    pub fn clean(&self) {
        self.book().clean();
    }

    /// Replaces the whole content of the ledger with `expenses`, replayed in
    /// order.
    ///
    /// The replacement is replayed into a fresh book first: on error the
    /// ledger is unchanged.
    pub fn replace_expenses(&self, expenses: Vec<Transaction>) -> ResultEngine<usize> {
        let mut fresh = Book::default();
        for tx in expenses {
            fresh.add(tx)?;
        }

        let count = fresh.expenses.len();
        *self.book() = fresh;
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.book().expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book().expenses.is_empty()
    }
}

impl Exportable for Ledger {
    type Record = Transaction;

    fn export(&self) -> Vec<Transaction> {
        self.list_expenses().into_iter().map(|(_, tx)| tx).collect()
    }

    fn restore(records: Vec<Transaction>) -> ResultEngine<Self> {
        let ledger = Ledger::new();
        {
            let mut book = ledger.book();
            for tx in records {
                book.add(tx)?;
            }
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn payer_listed_as_participant_is_charged_a_share() {
        let ledger = Ledger::new();
        ledger
            .add_expense("alice", names(&["alice", "bob"]), 10.0)
            .unwrap();
        let balances = ledger.list_balances();
        assert_eq!(balances["alice"], 5.0);
        assert_eq!(balances["bob"], -5.0);
    }

    #[test]
    fn rejected_expense_leaves_ledger_untouched() {
        let ledger = Ledger::new();
        assert_eq!(
            ledger.add_expense("alice", Vec::new(), 10.0),
            Err(EngineError::EmptyParticipants)
        );
        assert!(ledger.add_expense("alice", names(&["bob"]), -1.0).is_err());
        assert!(ledger.add_expense("alice", names(&["bob"]), f64::NAN).is_err());
        assert!(ledger.is_empty());
        assert!(ledger.list_balances().is_empty());
        assert_eq!(ledger.add_expense("alice", names(&["bob"]), 1.0), Ok(1));
    }

    #[test]
    fn overflowing_expense_is_rejected() {
        let ledger = Ledger::new();
        assert_eq!(ledger.add_expense("a", names(&["b"]), f64::MAX), Ok(1));
        assert!(matches!(
            ledger.add_expense("a", names(&["b"]), f64::MAX),
            Err(EngineError::InvalidAmount(_))
        ));

        let balances = ledger.list_balances();
        assert_eq!(balances.get("a"), Some(&f64::MAX));
        assert_eq!(balances.get("b"), Some(&-f64::MAX));
        assert_eq!(balances.values().sum::<f64>(), 0.0);
        assert_eq!(ledger.len(), 1);

        let transfers = ledger.settle(false);
        assert_eq!(transfers, vec![Transaction::transfer("b", "a", f64::MAX)]);

        ledger.remove_expense(1);
        assert!(ledger.list_balances().values().all(|b| *b == 0.0));
    }

    #[test]
    fn overflowing_replacement_keeps_current_expenses() {
        let ledger = Ledger::new();
        ledger.add_expense("alice", names(&["bob"]), 10.0).unwrap();

        let overflowing = vec![
            Transaction::new("a", names(&["b"]), f64::MAX),
            Transaction::new("a", names(&["b"]), f64::MAX),
        ];
        assert!(ledger.replace_expenses(overflowing.clone()).is_err());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.list_balances().get("alice"), Some(&10.0));

        assert!(Ledger::restore(overflowing).is_err());
    }

    #[test]
    fn list_balances_is_a_copy() {
        let ledger = Ledger::new();
        ledger.add_expense("alice", names(&["bob"]), 10.0).unwrap();
        let mut balances = ledger.list_balances();
        balances.insert("mallory".to_string(), 1000.0);
        assert!(!ledger.list_balances().contains_key("mallory"));
    }

    #[test]
    fn replace_expenses_is_all_or_nothing() {
        let ledger = Ledger::new();
        ledger.add_expense("alice", names(&["bob"]), 10.0).unwrap();

        let bad = vec![
            Transaction::new("carol", names(&["dave"]), 4.0),
            Transaction::new("carol", Vec::new(), 4.0),
        ];
        assert!(ledger.replace_expenses(bad).is_err());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.list_balances()["alice"], 10.0);

        let good = vec![
            Transaction::new("carol", names(&["dave"]), 4.0),
            Transaction::new("dave", names(&["carol"]), 1.0),
        ];
        assert_eq!(ledger.replace_expenses(good).unwrap(), 2);
        let ids: Vec<_> = ledger.list_expenses().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(!ledger.list_balances().contains_key("alice"));
    }

    #[test]
    fn export_and_restore_replay_in_order() {
        let ledger = Ledger::new();
        ledger.add_expense("alice", names(&["bob"]), 10.0).unwrap();
        let removed = ledger.add_expense("bob", names(&["alice"]), 3.0).unwrap();
        ledger.add_expense("carol", names(&["alice", "bob"]), 6.0).unwrap();
        ledger.remove_expense(removed);

        let restored = Ledger::restore(ledger.export()).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.list_balances(), ledger.list_balances());
        let ids: Vec<_> = restored.list_expenses().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
