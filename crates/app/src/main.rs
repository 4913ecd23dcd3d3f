use std::{error::Error, path::PathBuf, sync::Arc};

use engine::{Ledger, SessionStore};
use telegram_bot::UserId;

mod settings;
mod snapshot_file;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spartiamo={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let snapshot_path = PathBuf::from(&settings.sessions.snapshot_path);
    let store = Arc::new(SessionStore::<Ledger>::new(settings.sessions.ttl_days));
    let restored = snapshot_file::load(&snapshot_path, &store).await?;
    tracing::info!(
        "Restored {restored} sessions from {}",
        snapshot_path.display()
    );

    let Some(telegram) = settings.telegram else {
        tracing::warn!("No telegram settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found telegram settings...");
    let bot = build_bot(telegram, &settings.sessions, Arc::clone(&store))?;
    bot.run().await;

    snapshot_file::save(&snapshot_path, &store).await?;
    tracing::info!(
        "Saved {} sessions to {}",
        store.len(),
        snapshot_path.display()
    );

    Ok(())
}

fn build_bot(
    telegram: settings::Telegram,
    sessions: &settings::Sessions,
    store: Arc<SessionStore<Ledger>>,
) -> Result<telegram_bot::Bot, Box<dyn Error + Send + Sync>> {
    telegram_bot::Bot::builder()
        .token(&telegram.token)
        .allowed_users(telegram.allowed_users.into_iter().map(UserId).collect())
        .store(store)
        .sweep_interval(sessions.sweep_interval())
        .build()
        .map_err(|err| format!("failed to initialize telegram bot: {err}").into())
}
