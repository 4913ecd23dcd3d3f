//! Telegram bot.
//!
//! Every chat gets its own ledger from a shared [`SessionStore`]. The store is
//! owned by the caller, which decides how it is loaded and persisted: the bot
//! only reads and mutates it, and sweeps the expired sessions.

use std::{sync::Arc, time::Duration};

use engine::{Ledger, SessionStore};
use teloxide::{prelude::*, utils::command::BotCommands};

mod commands;
mod handlers;
mod parsing;
mod shutdown;
mod state;
mod sweeper;
mod ui;

pub use commands::Command;
pub use teloxide::types::UserId;

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    store: Arc<SessionStore<Ledger>>,
    pending: state::PendingImports,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    store: Arc<SessionStore<Ledger>>,
    sweep_interval: Duration,
}

impl Bot {
    pub fn new(
        token: &str,
        allowed_users: Option<Vec<UserId>>,
        store: Arc<SessionStore<Ledger>>,
        sweep_interval: Duration,
    ) -> Result<Self, String> {
        if token.trim().is_empty() {
            return Err("missing telegram token".to_string());
        }
        if sweep_interval.is_zero() {
            return Err("sweep interval must be greater than zero".to_string());
        }

        Ok(Self {
            token: token.to_string(),
            allowed_users,
            store,
            sweep_interval,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// Runs the bot until it is stopped with ctrl-c or SIGTERM.
    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let sweeper = sweeper::spawn(bot.clone(), Arc::clone(&self.store), self.sweep_interval);

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            store: Arc::clone(&self.store),
            pending: state::PendingImports::default(),
        };

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .branch(
                        dptree::entry()
                            .filter_command::<Command>()
                            .endpoint(handlers::handle_command),
                    )
                    .branch(dptree::endpoint(handlers::handle_message)),
            )
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        let mut dispatcher = Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build();

        let terminate = tokio::spawn(shutdown::stop_on(
            dispatcher.shutdown_token(),
            shutdown::terminate_signal(),
        ));
        dispatcher.dispatch().await;

        terminate.abort();
        sweeper.abort();
        tracing::info!("Telegram bot stopped");
    }
}

#[derive(Debug)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    store: Option<Arc<SessionStore<Ledger>>>,
    sweep_interval: Duration,
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self {
            token: String::new(),
            allowed_users: None,
            store: None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// An empty list lets everybody use the bot.
    pub fn allowed_users(mut self, allowed_users: Vec<UserId>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users);
        }
        self
    }

    pub fn store(mut self, store: Arc<SessionStore<Ledger>>) -> BotBuilder {
        self.store = Some(store);
        self
    }

    pub fn sweep_interval(mut self, sweep_interval: Duration) -> BotBuilder {
        self.sweep_interval = sweep_interval;
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let store = self
            .store
            .ok_or_else(|| "missing session store".to_string())?;
        Bot::new(&self.token, self.allowed_users, store, self.sweep_interval)
    }
}
