//! Network-layer error types.

use thiserror::Error;

/// Why a peer-connection attempt or a broadcast send failed.
///
/// Replaces the original's 9-character string-prefix match on
/// `"Cannot self-connect"` (fragile: any error whose message happens to share
/// that prefix would be misclassified) with a dedicated variant the health
/// loop can match on directly.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The health loop tried to dial its own listen address.
    #[error("cannot self-connect")]
    SelfConnect,
    /// A connection attempt to `addr` failed.
    #[error("connecting to {addr} failed: {reason}")]
    ConnectFailed {
        /// The address that was dialed.
        addr: String,
        /// The underlying failure, as reported by the connector.
        reason: String,
    },
    /// A connection attempt did not complete before its deadline.
    #[error("connecting to {0} timed out")]
    Timeout(String),
    /// The receiving end of an internal channel was dropped.
    #[error("channel closed")]
    ChannelClosed,
}
