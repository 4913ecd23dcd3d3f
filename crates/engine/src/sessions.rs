//! Per-conversation sessions with a sliding expiration.
//!
//! A [`SessionStore`] maps a conversation id to a payload (usually a
//! [`Ledger`]). The whole map sits behind one reader/writer lock:
//! [`get_or_create`], [`clean_expired`], [`remove`] and [`import_snapshot`]
//! take it exclusively, every read-only accessor takes it shared. The lock is
//! never held while encoding or decoding a snapshot, nor across I/O, which is
//! left to the caller.
//!
//! [`Ledger`]: crate::Ledger
//! [`get_or_create`]: SessionStore::get_or_create
//! [`clean_expired`]: SessionStore::clean_expired
//! [`remove`]: SessionStore::remove
//! [`import_snapshot`]: SessionStore::import_snapshot

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    EngineError, ResultEngine,
    snapshot::{SessionSnapshot, Snapshot},
};

/// External key of a conversation (a Telegram chat id).
pub type ConversationId = i64;

/// Payloads that can be written into a snapshot and rebuilt from it.
pub trait Exportable: Sized {
    type Record: Serialize + DeserializeOwned;

    /// Records that fully describe the payload, in replay order.
    fn export(&self) -> Vec<Self::Record>;

    /// Rebuilds a payload by replaying `records`.
    fn restore(records: Vec<Self::Record>) -> ResultEngine<Self>;
}

#[derive(Debug)]
pub struct Session<T> {
    id: ConversationId,
    ledger: Arc<T>,
    expire_at: DateTime<Utc>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            ledger: Arc::clone(&self.ledger),
            expire_at: self.expire_at,
        }
    }
}

impl<T> Session<T> {
    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn ledger(&self) -> &Arc<T> {
        &self.ledger
    }

    pub fn expire_at(&self) -> DateTime<Utc> {
        self.expire_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_at < now
    }
}

#[derive(Debug)]
pub struct SessionStore<T> {
    ttl: TimeDelta,
    sessions: RwLock<HashMap<ConversationId, Session<T>>>,
}

impl<T> SessionStore<T> {
    /// Creates an empty store whose sessions live `ttl_days` after their last
    /// access.
    pub fn new(ttl_days: u32) -> Self {
        Self {
            ttl: TimeDelta::days(i64::from(ttl_days)),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    // Every critical section below leaves the map consistent, a poisoned
    // lock is safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<ConversationId, Session<T>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ConversationId, Session<T>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns the payload of `id`, creating it with `factory` on first use.
    ///
    /// This is the only operation that extends a session's expiration.
    pub fn get_or_create<F>(&self, id: ConversationId, factory: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        self.get_or_create_at(id, Utc::now(), factory)
    }

    /// [`get_or_create`](Self::get_or_create) with an explicit clock.
    pub fn get_or_create_at<F>(&self, id: ConversationId, now: DateTime<Utc>, factory: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let expire_at = self.expiry_from(now);
        let mut sessions = self.write();
        let session = sessions
            .entry(id)
            .and_modify(|session| session.expire_at = expire_at)
            .or_insert_with(|| Session {
                id,
                ledger: Arc::new(factory()),
                expire_at,
            });
        Arc::clone(&session.ledger)
    }

    /// Looks a session up without refreshing its expiration.
    pub fn get(&self, id: ConversationId) -> Option<Arc<T>> {
        self.read()
            .get(&id)
            .map(|session| Arc::clone(&session.ledger))
    }

    pub fn expire_at(&self, id: ConversationId) -> Option<DateTime<Utc>> {
        self.read().get(&id).map(|session| session.expire_at)
    }

    /// Drops the session of `id`, returning its payload if it existed.
    pub fn remove(&self, id: ConversationId) -> Option<Arc<T>> {
        self.write().remove(&id).map(|session| session.ledger)
    }

    /// Live conversation ids, ascending.
    pub fn ids(&self) -> Vec<ConversationId> {
        let mut ids: Vec<_> = self.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// A point-in-time copy of every session, ordered by id.
    pub fn sessions(&self) -> Vec<Session<T>> {
        let mut sessions: Vec<_> = self.read().values().cloned().collect();
        sessions.sort_by_key(Session::id);
        sessions
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Deletes every session whose expiration is in the past and returns
    /// their ids, ascending.
    pub fn clean_expired(&self) -> Vec<ConversationId> {
        self.clean_expired_at(Utc::now())
    }

    /// [`clean_expired`](Self::clean_expired) with an explicit clock.
    pub fn clean_expired_at(&self, now: DateTime<Utc>) -> Vec<ConversationId> {
        let mut sessions = self.write();
        let mut expired = Vec::new();
        sessions.retain(|id, session| {
            if session.is_expired_at(now) {
                expired.push(*id);
                false
            } else {
                true
            }
        });
        expired.sort_unstable();
        expired
    }
}

impl<T: Exportable> SessionStore<T> {
    /// Serializes every live session: its id, its expiration and the records
    /// of its payload.
    pub fn export_snapshot(&self) -> ResultEngine<Vec<u8>> {
        let snapshot = Snapshot {
            sessions: self
                .sessions()
                .into_iter()
                .map(|session| SessionSnapshot {
                    id: session.id,
                    expire: session.expire_at.timestamp(),
                    transactions: session.ledger.export(),
                })
                .collect(),
        };
        snapshot.encode()
    }

    /// Restores the sessions recorded in `blob`, returning how many were
    /// loaded.
    ///
    /// The whole blob is decoded and replayed before the store is touched:
    /// on error no session is added or replaced. Restored sessions keep their
    /// persisted expiration, even if it is already in the past.
    pub fn import_snapshot(&self, blob: &[u8]) -> ResultEngine<usize> {
        let snapshot = Snapshot::<T::Record>::decode(blob)?;

        let mut seen = HashSet::new();
        let mut restored = Vec::with_capacity(snapshot.sessions.len());
        for entry in snapshot.sessions {
            if !seen.insert(entry.id) {
                return Err(EngineError::InvalidSnapshot(format!(
                    "session {} recorded twice",
                    entry.id
                )));
            }
            let expire_at = DateTime::from_timestamp(entry.expire, 0).ok_or_else(|| {
                EngineError::InvalidSnapshot(format!(
                    "session {} has an invalid expiration {}",
                    entry.id, entry.expire
                ))
            })?;
            let ledger = T::restore(entry.transactions).map_err(|err| {
                EngineError::InvalidSnapshot(format!("session {}: {err}", entry.id))
            })?;
            restored.push(Session {
                id: entry.id,
                ledger: Arc::new(ledger),
                expire_at,
            });
        }

        let count = restored.len();
        let mut sessions = self.write();
        for session in restored {
            sessions.insert(session.id, session);
        }
        Ok(count)
    }
}
