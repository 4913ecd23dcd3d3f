use std::{collections::HashMap, sync::Arc};

use engine::Transaction;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

/// Imported expenses waiting for the user to confirm that the current ones
/// can be replaced.
#[derive(Clone, Default)]
pub(crate) struct PendingImports {
    inner: Arc<Mutex<HashMap<ChatId, Vec<Transaction>>>>,
}

impl PendingImports {
    /// Parks `expenses` for `chat_id`, replacing any previous import.
    pub(crate) async fn park(&self, chat_id: ChatId, expenses: Vec<Transaction>) {
        let mut guard = self.inner.lock().await;
        guard.insert(chat_id, expenses);
    }

    pub(crate) async fn take(&self, chat_id: ChatId) -> Option<Vec<Transaction>> {
        let mut guard = self.inner.lock().await;
        guard.remove(&chat_id)
    }
}
