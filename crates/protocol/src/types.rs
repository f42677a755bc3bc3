//! Core types shared across the protocol

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Pending,
    Online,
    Offline,
    Expired,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChannelStatus::Pending => "pending",
            ChannelStatus::Online => "online",
            ChannelStatus::Offline => "offline",
            ChannelStatus::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// One paired (or pairing) WhatsApp line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    /// Phone number, unique across the registry
    pub phone: String,
    /// Human-readable label, set at pairing time
    pub name: String,
    pub status: ChannelStatus,
    /// Operator who initiated the pairing; immutable after creation
    pub paired_by: String,
    /// Refreshed on every transition to `online`
    pub last_transition_at: DateTime<Utc>,
}

/// Body of `PUT /numbers/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ChannelStatus,
}
