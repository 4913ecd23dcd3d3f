use std::{
    error::Error,
    path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{ConversationId, Ledger, SessionStore, format_amount};

/// Only used to build the store: imported sessions keep their own expiry.
const TTL_DAYS: u32 = 120;

#[derive(Parser, Debug)]
#[command(name = "spartiamo_admin")]
#[command(about = "Admin utilities for Spartiamo (inspect and prune snapshots)")]
struct Cli {
    /// Snapshot file written by the bot (also read from `SPARTIAMO_SNAPSHOT_PATH`).
    #[arg(long, env = "SPARTIAMO_SNAPSHOT_PATH", default_value = "./snapshot.json")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every conversation with its expiry and number of expenses.
    Sessions,
    /// Show expenses, balances and suggested transfers of one conversation.
    Show(ShowArgs),
    /// Drop expired conversations and rewrite the snapshot.
    Prune,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[arg(long, allow_hyphen_values = true)]
    chat: ConversationId,
}

fn format_expiry(expire_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let stamp = expire_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    if expire_at < now {
        format!("{stamp} (expired)")
    } else {
        stamp
    }
}

async fn load(path: &Path) -> Result<SessionStore<Ledger>, Box<dyn Error + Send + Sync>> {
    let blob = tokio::fs::read(path)
        .await
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let store = SessionStore::new(TTL_DAYS);
    store.import_snapshot(&blob)?;
    Ok(store)
}

async fn save(path: &Path, store: &SessionStore<Ledger>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let blob = store.export_snapshot()?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, &blob).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let store = load(&cli.snapshot).await?;
    let now = Utc::now();

    match cli.command {
        Command::Sessions => {
            if store.is_empty() {
                println!("no sessions");
            }
            for session in store.sessions() {
                println!(
                    "{:>16}  {}  {} expenses",
                    session.id(),
                    format_expiry(session.expire_at(), now),
                    session.ledger().len()
                );
            }
        }
        Command::Show(args) => {
            let Some(ledger) = store.get(args.chat) else {
                eprintln!("session not found: {}", args.chat);
                std::process::exit(1);
            };
            if let Some(expire_at) = store.expire_at(args.chat) {
                println!("expires: {}", format_expiry(expire_at, now));
            }

            println!("expenses:");
            for (id, tx) in ledger.list_expenses() {
                println!(
                    "  {id:>4}. {} paid {} for {}",
                    tx.payer,
                    format_amount(tx.amount),
                    tx.participants.join(", ")
                );
            }

            println!("balances:");
            for (participant, balance) in ledger.list_balances() {
                println!("  {participant}: {}", format_amount(balance));
            }

            println!("transfers:");
            for tx in ledger.settle(false) {
                println!(
                    "  {} -> {}: {}",
                    tx.payer,
                    tx.creditor().unwrap_or("?"),
                    format_amount(tx.amount)
                );
            }
        }
        Command::Prune => {
            let evicted = store.clean_expired_at(now);
            if evicted.is_empty() {
                println!("nothing to prune");
                return Ok(());
            }
            save(&cli.snapshot, &store).await?;
            for id in &evicted {
                println!("pruned: {id}");
            }
            println!("{} sessions left", store.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn cli_reads_negative_chat_ids() {
        let cli = Cli::try_parse_from(["spartiamo_admin", "show", "--chat", "-1001234"]).unwrap();
        match cli.command {
            Command::Show(args) => assert_eq!(args.chat, -1001234),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn snapshot_path_has_a_default() {
        let cli = Cli::try_parse_from(["spartiamo_admin", "sessions"]).unwrap();
        assert_eq!(cli.snapshot, PathBuf::from("./snapshot.json"));
    }

    #[test]
    fn expired_sessions_are_marked() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            format_expiry(now - TimeDelta::seconds(1), now),
            "2023-11-14T22:13:19Z (expired)"
        );
        assert_eq!(format_expiry(now, now), "2023-11-14T22:13:20Z");
    }
}
