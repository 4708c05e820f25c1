//! The small set of control messages the overlay itself originates,
//! as opposed to the blocks/transactions it merely forwards (§4.5).
//!
//! Full wire framing is out of scope; this only needs to
//! round-trip through the canonical codec `corechain-types` already
//! provides, the same way every other payload on the wire does.

use serde::{Deserialize, Serialize};

use corechain_types::codec::{from_bytes_canonical, to_bytes_canonical};
use corechain_types::CodecError;

/// A control-plane packet originated by the overlay's own services, rather
/// than forwarded application data (blocks, transactions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkMessage {
    /// Broadcast periodically by `TimeService` (§4.5).
    TimeSync {
        /// Unix timestamp, seconds.
        unix_time: i64,
    },
    /// Sent by `CheckHealthService` when its candidate-IP channel runs dry,
    /// asking peers for more addresses to try.
    NeighborRequest,
}

impl NetworkMessage {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        to_bytes_canonical(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        from_bytes_canonical(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_sync_round_trips() {
        let msg = NetworkMessage::TimeSync { unix_time: 1_700_000_000 };
        let bytes = msg.encode().unwrap();
        assert_eq!(NetworkMessage::decode(&bytes).unwrap(), msg);
    }
}
