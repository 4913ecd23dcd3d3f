use std::{sync::Arc, time::Duration};

use engine::{Ledger, SessionStore};
use teloxide::prelude::*;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::ui;

/// Spawns the task that evicts expired sessions every `period` and tells
/// each evicted chat that its expenses are gone.
///
/// The first sweep runs immediately, so sessions restored already expired
/// are dropped at startup.
pub(crate) fn spawn(
    bot: Bot,
    store: Arc<SessionStore<Ledger>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            sweep(&bot, &store).await;
        }
    })
}

async fn sweep(bot: &Bot, store: &SessionStore<Ledger>) {
    let evicted = store.clean_expired();
    if evicted.is_empty() {
        return;
    }
    tracing::info!("evicted {} expired sessions", evicted.len());

    for id in evicted {
        if let Err(err) = bot.send_message(ChatId(id), ui::EXPIRED).await {
            tracing::warn!("failed to notify chat {id} of its expiration: {err}");
        }
    }
}
