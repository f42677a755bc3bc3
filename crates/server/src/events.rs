//! Broadcast fan-out to connected dashboard observers
//!
//! Unicast replies go through each connection's outbound channel in
//! `websocket.rs`; everything here is the all-observers side of the
//! transport.

use tokio::sync::broadcast;
use tracing::debug;

use zaplink_protocol::ServerMessage;

/// Events kept per subscriber before a slow observer starts lagging
pub const EVENT_BUFFER: usize = 100;

/// Handle to the broadcast channel shared by all observers
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<ServerMessage>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe a new observer. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    /// Fire-and-forget delivery to all observers. A send error only means
    /// nobody is connected; it never reaches the caller.
    pub fn broadcast(&self, msg: ServerMessage) {
        if self.tx.send(msg).is_err() {
            debug!(
                component = "events",
                event = "events.broadcast.no_observers",
                "Broadcast dropped, no observers connected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_without_observers_does_not_error() {
        let hub = EventHub::new(EVENT_BUFFER);
        hub.broadcast(ServerMessage::NumberDeleted {
            id: "+5511912345678".to_string(),
        });
    }

    #[tokio::test]
    async fn all_subscribers_receive_each_event() {
        let hub = EventHub::new(EVENT_BUFFER);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.broadcast(ServerMessage::NumberDeleted {
            id: "+5511912345678".to_string(),
        });

        for rx in [&mut first, &mut second] {
            match rx.try_recv().expect("event delivered") {
                ServerMessage::NumberDeleted { id } => assert_eq!(id, "+5511912345678"),
                other => panic!("unexpected message: {:?}", other),
            }
        }
    }
}
