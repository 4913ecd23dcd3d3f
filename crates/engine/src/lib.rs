//! Settlement engine for shared expenses.
//!
//! A [`Ledger`] records who paid what for whom and keeps the running balance
//! of every participant; [`Ledger::settle`] turns the balances into a short
//! list of transfers. A [`SessionStore`] gives every conversation its own
//! expiring ledger and saves/restores all of them through a [`Snapshot`].
//!
//! ```rust
//! use engine::{Ledger, SessionStore};
//!
//! let store = SessionStore::new(120);
//! let ledger = store.get_or_create(42, Ledger::new);
//! ledger
//!     .add_expense("@alice", vec!["@bob".into(), "@carol".into()], 30.0)
//!     .unwrap();
//!
//! let transfers = ledger.settle(false);
//! assert_eq!(transfers.len(), 2);
//! ```

pub use amount::{EPSILON, format_amount, is_settled, parse_amount};
pub use error::EngineError;
pub use exchange::{export_csv, import_csv};
pub use ledger::Ledger;
pub use sessions::{ConversationId, Exportable, Session, SessionStore};
pub use settle::settle_balances;
pub use snapshot::{SessionSnapshot, Snapshot};
pub use transactions::{ExpenseId, Transaction};

mod amount;
mod error;
mod exchange;
mod ledger;
mod sessions;
mod settle;
mod snapshot;
mod transactions;

pub type ResultEngine<T> = Result<T, EngineError>;
