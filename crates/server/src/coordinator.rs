//! Pairing coordinator
//!
//! Drives the state machine for each pairing attempt: validate the
//! request, create a pending record, issue the scannable credential, and
//! schedule the timed transition to online. Status changes and deletions
//! also flow through here so every externally visible transition is
//! broadcast exactly once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use zaplink_protocol::{ChannelRecord, ChannelStatus, ServerMessage};

use crate::events::EventHub;
use crate::qr;
use crate::registry::{ChannelRegistry, RegistryError};

/// Pairing-level failures. All are reported to the immediate caller and
/// none are fatal to the server; a failed request leaves other in-flight
/// sessions untouched.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("name and phone are required")]
    InvalidRequest,
    #[error("number {0} is already registered")]
    DuplicateIdentity(String),
    #[error("number {0} is not registered")]
    NotFound(String),
    #[error("failed to build pairing credential: {0}")]
    Credential(String),
}

impl From<RegistryError> for PairingError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateIdentity(phone) => PairingError::DuplicateIdentity(phone),
            RegistryError::NotFound(phone) => PairingError::NotFound(phone),
        }
    }
}

/// Orchestrates pairing attempts against the registry and the event hub
pub struct PairingCoordinator {
    registry: Arc<ChannelRegistry>,
    hub: EventHub,
    delay: Duration,
    /// In-flight completion timers, keyed by phone number
    timers: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl PairingCoordinator {
    pub fn new(registry: Arc<ChannelRegistry>, hub: EventHub, delay: Duration) -> Self {
        Self {
            registry,
            hub,
            delay,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start pairing a new number. On success the pending record is
    /// stored, the completion timer is armed, and the scannable
    /// credential is returned for the caller to unicast to the requester.
    pub async fn start_pairing(
        &self,
        name: &str,
        phone: &str,
        paired_by: &str,
    ) -> Result<String, PairingError> {
        let name = name.trim();
        let phone = phone.trim();
        if name.is_empty() || phone.is_empty() {
            return Err(PairingError::InvalidRequest);
        }

        // Built before the insert so a credential failure leaves no record
        let credential =
            qr::pairing_credential(phone).map_err(|e| PairingError::Credential(e.to_string()))?;

        let record = ChannelRecord {
            phone: phone.to_string(),
            name: name.to_string(),
            status: ChannelStatus::Pending,
            paired_by: paired_by.trim().to_string(),
            last_transition_at: Utc::now(),
        };
        self.registry.insert(record).await?;
        self.schedule_completion(phone.to_string()).await;

        info!(
            component = "pairing",
            event = "pairing.session.pending",
            phone = %phone,
            delay_secs = self.delay.as_secs(),
            "Pairing session pending, credential issued"
        );
        Ok(credential)
    }

    /// Arm the one-shot completion timer for a pending pairing. The timer
    /// stands in for a real device-linking handshake reporting back.
    async fn schedule_completion(&self, phone: String) {
        let registry = Arc::clone(&self.registry);
        let hub = self.hub.clone();
        let timers = Arc::clone(&self.timers);
        let delay = self.delay;
        let key = phone.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match registry.complete_pairing(&phone).await {
                Some(record) => {
                    info!(
                        component = "pairing",
                        event = "pairing.session.online",
                        phone = %phone,
                        "Pairing complete, channel online"
                    );
                    hub.broadcast(ServerMessage::Ready { number: record });
                }
                None => {
                    debug!(
                        component = "pairing",
                        event = "pairing.session.lapsed",
                        phone = %phone,
                        "Channel gone or no longer pending, completion skipped"
                    );
                }
            }
            timers.lock().await.remove(&phone);
        });

        self.timers.lock().await.insert(key, handle);
    }

    /// Set a channel's status on behalf of an operator and broadcast the
    /// change. All four statuses are freely settable here.
    pub async fn set_status(
        &self,
        phone: &str,
        status: ChannelStatus,
    ) -> Result<ChannelRecord, PairingError> {
        let record = self.registry.update_status(phone, status).await?;
        info!(
            component = "pairing",
            event = "pairing.status.updated",
            phone = %phone,
            status = %record.status,
            "Channel status updated"
        );
        self.hub.broadcast(ServerMessage::StatusUpdate {
            number: record.clone(),
        });
        Ok(record)
    }

    /// Remove a channel entirely, cancelling any in-flight completion
    /// timer, and broadcast the deletion.
    pub async fn delete_channel(&self, phone: &str) -> Result<ChannelRecord, PairingError> {
        let record = self.registry.remove(phone).await?;
        if let Some(handle) = self.timers.lock().await.remove(phone) {
            handle.abort();
        }
        info!(
            component = "pairing",
            event = "pairing.channel.deleted",
            phone = %phone,
            "Channel deleted"
        );
        self.hub.broadcast(ServerMessage::NumberDeleted {
            id: record.phone.clone(),
        });
        Ok(record)
    }
}
