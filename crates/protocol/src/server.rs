//! Server → Client messages

use serde::{Deserialize, Serialize};

use crate::types::ChannelRecord;

/// Messages sent from the server to clients.
///
/// `Qr` and `PairingError` are unicast to the requesting client only;
/// the remaining variants are broadcast to every connected observer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Scannable pairing credential for the requested number
    Qr { number: String, qr: String },
    /// Pairing request rejected; no state was created
    PairingError { number: String, message: String },

    /// Pairing completed, the channel is online
    Ready { number: ChannelRecord },
    /// A channel's status was changed by an operator
    StatusUpdate { number: ChannelRecord },
    /// A channel was removed from the registry
    NumberDeleted { id: String },
}

#[cfg(test)]
mod tests {
    use super::ServerMessage;
    use crate::types::{ChannelRecord, ChannelStatus};
    use chrono::Utc;

    fn record() -> ChannelRecord {
        ChannelRecord {
            phone: "+5511912345678".to_string(),
            name: "Vendas Varejo".to_string(),
            status: ChannelStatus::Online,
            paired_by: "Admin".to_string(),
            last_transition_at: Utc::now(),
        }
    }

    #[test]
    fn qr_event_uses_expected_tag_and_fields() {
        let msg = ServerMessage::Qr {
            number: "+5511912345678".to_string(),
            qr: "data:image/svg+xml;base64,abc".to_string(),
        };

        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("\"type\":\"qr\""));
        assert!(json.contains("\"number\":\"+5511912345678\""));
        assert!(json.contains("\"qr\":\"data:image/svg+xml;base64,abc\""));
    }

    #[test]
    fn roundtrip_ready_carries_full_record() {
        let msg = ServerMessage::Ready { number: record() };

        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("\"type\":\"ready\""));

        let reparsed: ServerMessage = serde_json::from_str(&json).expect("deserialize");
        match reparsed {
            ServerMessage::Ready { number } => {
                assert_eq!(number.phone, "+5511912345678");
                assert_eq!(number.status, ChannelStatus::Online);
                assert_eq!(number.paired_by, "Admin");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn status_update_and_deletion_tags() {
        let update = ServerMessage::StatusUpdate { number: record() };
        let json = serde_json::to_string(&update).expect("serialize status-update");
        assert!(json.contains("\"type\":\"status-update\""));

        let deleted = ServerMessage::NumberDeleted {
            id: "+5511912345678".to_string(),
        };
        let json = serde_json::to_string(&deleted).expect("serialize number-deleted");
        assert!(json.contains("\"type\":\"number-deleted\""));
        assert!(json.contains("\"id\":\"+5511912345678\""));
    }

    #[test]
    fn deserializes_pairing_error() {
        let json = r#"{
          "type":"pairing-error",
          "number":"+5511912345678",
          "message":"number +5511912345678 is already registered"
        }"#;

        let parsed: ServerMessage = serde_json::from_str(json).expect("parse pairing-error");
        match parsed {
            ServerMessage::PairingError { number, message } => {
                assert_eq!(number, "+5511912345678");
                assert!(message.contains("already registered"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
