//! The seam between the overlay's bookkeeping and actual socket I/O.
//!
//! Low-level connection framing is explicitly out of scope.
//! `PeerConnector` is what `CheckHealthService` dials through instead of
//! opening a TCP socket directly — a real binary wires in an
//! implementation that speaks the wire protocol; tests wire in a fake.

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::peer::PeerHandle;

/// Initiates an outbound connection to a miner at `addr` ("ip:port").
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Dials `addr`, returning a registered handle on success.
    ///
    /// Implementations are expected to return `NetworkError::SelfConnect`
    /// when `addr` is this node's own listen address, rather than the
    /// original's string-matched "Cannot self-connect" error text.
    async fn connect(&self, addr: &str) -> Result<PeerHandle, NetworkError>;
}
