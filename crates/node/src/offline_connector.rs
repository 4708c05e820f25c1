//! [`OfflineConnector`]: the default [`PeerConnector`] a `corechain-miner`
//! binary wires in until a real socket transport is plugged in behind the
//! same trait. Socket framing is explicitly out of scope for this crate;
//! this stub exists so `CheckHealthService` has something to dial and the
//! self-connect detection path is exercised end-to-end.

use async_trait::async_trait;

use corechain_network::{NetworkError, PeerConnector, PeerHandle, PeerType};

/// A connector that refuses every dial except to recognize (and reject) a
/// self-connect attempt. A real deployment replaces this with one that
/// actually opens a TCP socket and performs the handshake.
pub struct OfflineConnector {
    self_ip_port: String,
}

impl OfflineConnector {
    /// Builds a connector that treats `self_ip_port` as this node's own
    /// listen address.
    pub fn new(self_ip_port: impl Into<String>) -> Self {
        Self {
            self_ip_port: self_ip_port.into(),
        }
    }
}

#[async_trait]
impl PeerConnector for OfflineConnector {
    async fn connect(&self, addr: &str) -> Result<PeerHandle, NetworkError> {
        if !self.self_ip_port.is_empty() && addr == self.self_ip_port {
            return Err(NetworkError::SelfConnect);
        }
        Err(NetworkError::ConnectFailed {
            addr: addr.to_string(),
            reason: "no transport layer wired in".to_string(),
        })
    }
}

/// Registers `addr` directly as a miner peer without dialing anything —
/// used by tests and by a single-node "solo mining" configuration where
/// there is no overlay to join. `peer_type` mirrors
/// [`corechain_network::PeerType`]'s two roles.
pub fn register_offline_peer(addr: &str, peer_type: PeerType) -> PeerHandle {
    PeerHandle::new(addr, peer_type).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dialing_self_is_refused_as_self_connect() {
        let connector = OfflineConnector::new("127.0.0.1:9000");
        let err = connector.connect("127.0.0.1:9000").await.unwrap_err();
        assert!(matches!(err, NetworkError::SelfConnect));
    }

    #[tokio::test]
    async fn dialing_anyone_else_fails_with_no_transport() {
        let connector = OfflineConnector::new("127.0.0.1:9000");
        let err = connector.connect("10.0.0.5:9000").await.unwrap_err();
        assert!(matches!(err, NetworkError::ConnectFailed { .. }));
    }
}
