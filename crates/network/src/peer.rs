//! A single peer connection as seen by the overlay (§4.5, C5).

use tokio::sync::mpsc;

/// The two connection roles the overlay distinguishes. Miners receive block
/// and transaction gossip plus health-check traffic; clients only receive
/// client-facing broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerType {
    Miner,
    Client,
}

/// The outbound channel capacity every peer connection is given (§5, §9:
/// "preserve both thresholds literally").
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 1000;

/// A registered peer: its dial-back address and the bounded outbound channel
/// messages to it are queued on. The other end of `sender` is drained by the
/// (out-of-scope) transport layer that actually writes bytes to the socket.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    ip_port: String,
    peer_type: PeerType,
    sender: mpsc::Sender<Vec<u8>>,
}

impl PeerHandle {
    /// Builds a handle and the receiver the transport layer should drain.
    pub fn new(ip_port: impl Into<String>, peer_type: PeerType) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (sender, receiver) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);
        (
            Self {
                ip_port: ip_port.into(),
                peer_type,
                sender,
            },
            receiver,
        )
    }

    pub fn ip_port(&self) -> &str {
        &self.ip_port
    }

    pub fn peer_type(&self) -> PeerType {
        self.peer_type
    }

    /// Enqueues a message without blocking. Returns `false` if the channel is
    /// at capacity or closed — the caller's job is to decide what to do with
    /// a message that didn't fit, not this handle's.
    pub fn try_send(&self, msg: Vec<u8>) -> bool {
        self.sender.try_send(msg).is_ok()
    }

    /// Whether `other` is a clone of the same underlying channel — the
    /// identity check the original used (`connection.peer != p`) to notice a
    /// reconnect swapped in a fresh connection behind the same address.
    pub fn same_channel(&self, other: &PeerHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }
}
