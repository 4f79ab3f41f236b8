//! In-memory message store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::ServerCapabilities;
use crate::store::pin::PinDigest;
use crate::store::{CreatedMessage, MessageStore, StoreError};

/// A stored message and its gate.
#[derive(Debug)]
struct StoredMessage {
    data: String,
    pin: PinDigest,
    expires_at: DateTime<Utc>,
    failed_attempts: u32,
}

impl StoredMessage {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A thread-safe, read-once message store kept in process memory.
///
/// Messages are lost on restart. Each key is guarded by its DashMap shard,
/// so concurrent retrievals of the same key are serialized.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, StoredMessage>>,
    max_pin_attempts: u32,
    max_exp: Duration,
}

impl MemoryStore {
    /// Create an empty store enforcing the given limits.
    pub fn new(limits: ServerCapabilities) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            max_pin_attempts: limits.max_pin_attempts,
            max_exp: Duration::from_secs(limits.max_exp_secs),
        }
    }

    /// Number of messages currently held, expired or not.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every expired message. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.inner.len();
        self.inner.retain(|_, msg| !msg.is_expired(now));
        before.saturating_sub(self.inner.len())
    }

    /// Periodically purge expired messages until shutdown.
    pub async fn run_cleanup(self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.purge_expired();
                    if removed > 0 {
                        tracing::debug!(
                            removed,
                            remaining = self.inner.len(),
                            "Purged expired messages"
                        );
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Message cleanup stopped");
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(
        &self,
        ttl: Duration,
        message: &str,
        pin: &str,
    ) -> Result<CreatedMessage, StoreError> {
        let invalid = StoreError::InvalidExpiration {
            max_secs: self.max_exp.as_secs(),
        };
        if ttl.is_zero() || ttl > self.max_exp {
            return Err(invalid);
        }
        let exp = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or(invalid)?;
        let key = Uuid::new_v4().to_string();

        self.inner.insert(
            key.clone(),
            StoredMessage {
                data: message.to_string(),
                pin: PinDigest::new(pin),
                expires_at: exp,
                failed_attempts: 0,
            },
        );

        Ok(CreatedMessage { key, exp })
    }

    async fn retrieve_message(&self, key: &str, pin: &str) -> Result<String, StoreError> {
        let now = Utc::now();
        let mut entry = match self.inner.entry(key.to_string()) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(_) => return Err(StoreError::NotFound),
        };

        if entry.get().is_expired(now) {
            entry.remove();
            return Err(StoreError::Expired);
        }

        if entry.get().pin.verify(pin) {
            return Ok(entry.remove().data);
        }

        let msg = entry.get_mut();
        msg.failed_attempts += 1;
        if msg.failed_attempts >= self.max_pin_attempts {
            entry.remove();
            return Err(StoreError::AttemptsExhausted);
        }
        Err(StoreError::BadPinAttempt)
    }
}
