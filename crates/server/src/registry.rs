//! Channel registry
//!
//! Authoritative in-memory set of channel records, keyed by phone number.
//! State lives for the process lifetime only; a durable store could back
//! the same interface later without touching the pairing protocol.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;

use zaplink_protocol::{ChannelRecord, ChannelStatus};

/// Registry-level failures, surfaced as structured results to the caller
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("number {0} is already registered")]
    DuplicateIdentity(String),
    #[error("number {0} is not registered")]
    NotFound(String),
}

/// In-memory store of channel records
pub struct ChannelRegistry {
    channels: Mutex<HashMap<String, ChannelRecord>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// All registered channels, sorted by phone number
    pub async fn list(&self) -> Vec<ChannelRecord> {
        let channels = self.channels.lock().await;
        let mut records: Vec<ChannelRecord> = channels.values().cloned().collect();
        records.sort_by(|a, b| a.phone.cmp(&b.phone));
        records
    }

    /// Look up a channel; `None` for an unknown number is not an error
    pub async fn find(&self, identity: &str) -> Option<ChannelRecord> {
        self.channels.lock().await.get(identity).cloned()
    }

    /// Add a new channel. The duplicate check and the insert happen under
    /// one lock guard so concurrent pairing attempts for the same number
    /// cannot both succeed.
    pub async fn insert(&self, record: ChannelRecord) -> Result<ChannelRecord, RegistryError> {
        let mut channels = self.channels.lock().await;
        if channels.contains_key(&record.phone) {
            return Err(RegistryError::DuplicateIdentity(record.phone.clone()));
        }
        channels.insert(record.phone.clone(), record.clone());
        Ok(record)
    }

    /// Set a channel's status in place. `last_transition_at` is refreshed
    /// only when the channel comes online.
    pub async fn update_status(
        &self,
        identity: &str,
        status: ChannelStatus,
    ) -> Result<ChannelRecord, RegistryError> {
        let mut channels = self.channels.lock().await;
        let record = channels
            .get_mut(identity)
            .ok_or_else(|| RegistryError::NotFound(identity.to_string()))?;
        record.status = status;
        if status == ChannelStatus::Online {
            record.last_transition_at = Utc::now();
        }
        Ok(record.clone())
    }

    /// Flip a still-pending channel to online. Returns `None` when the
    /// record was deleted or moved past `pending` before the pairing
    /// window closed, making a late completion timer a no-op.
    pub async fn complete_pairing(&self, identity: &str) -> Option<ChannelRecord> {
        let mut channels = self.channels.lock().await;
        let record = channels.get_mut(identity)?;
        if record.status != ChannelStatus::Pending {
            return None;
        }
        record.status = ChannelStatus::Online;
        record.last_transition_at = Utc::now();
        Some(record.clone())
    }

    /// Remove a channel, returning the removed record
    pub async fn remove(&self, identity: &str) -> Result<ChannelRecord, RegistryError> {
        self.channels
            .lock()
            .await
            .remove(identity)
            .ok_or_else(|| RegistryError::NotFound(identity.to_string()))
    }
}
