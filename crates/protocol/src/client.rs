//! Client → Server messages

use serde::{Deserialize, Serialize};

/// Messages sent from a dashboard client to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Request pairing of a new WhatsApp number
    #[serde(rename_all = "camelCase")]
    StartSession {
        name: String,
        phone: String,
        paired_by: String,
    },
}
