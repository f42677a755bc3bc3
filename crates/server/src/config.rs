//! Server configuration

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;

/// Zaplink — WhatsApp channel pairing server
#[derive(Debug, Parser)]
#[command(name = "zaplink", version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "ZAPLINK_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "ZAPLINK_PORT", default_value_t = 4000)]
    pub port: u16,

    /// Seconds between credential issuance and the automatic transition
    /// to online. Stand-in for a real pairing handshake round trip.
    #[arg(long, env = "ZAPLINK_PAIRING_DELAY_SECS", default_value_t = 8)]
    pub pairing_delay_secs: u64,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn pairing_delay(&self) -> Duration {
        Duration::from_secs(self.pairing_delay_secs)
    }
}
