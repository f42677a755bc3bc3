//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use crate::coordinator::PairingCoordinator;
use crate::events::{EventHub, EVENT_BUFFER};
use crate::registry::ChannelRegistry;

/// State shared by the WebSocket and REST handlers. The registry is the
/// single mutable resource; all mutations go through it via the
/// coordinator.
pub struct AppState {
    registry: Arc<ChannelRegistry>,
    hub: EventHub,
    coordinator: PairingCoordinator,
}

impl AppState {
    pub fn new(pairing_delay: Duration) -> Self {
        let registry = Arc::new(ChannelRegistry::new());
        let hub = EventHub::new(EVENT_BUFFER);
        let coordinator =
            PairingCoordinator::new(Arc::clone(&registry), hub.clone(), pairing_delay);
        Self {
            registry,
            hub,
            coordinator,
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub fn coordinator(&self) -> &PairingCoordinator {
        &self.coordinator
    }
}

// Note: no Default impl — the pairing delay is configuration
