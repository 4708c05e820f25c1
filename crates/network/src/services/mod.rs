//! The five long-lived cooperative services the overlay runs (§4.5, §5).
//!
//! Each service is a plain `async fn` meant to be handed to
//! `tokio::task::spawn` once at node startup; none of them return unless
//! their governing channel is dropped. The single-ownership pattern from
//! the original (`PeerService` is the sole mutator of the peer table) is
//! preserved by construction: only [`peer_service::peer_service`] ever
//! calls [`crate::PeerTable::add`] or [`crate::PeerTable::remove`].

/// Forwards broadcast messages to client and miner peers.
pub mod broadcast;
/// Reconnects to the bootstrap node and maintains the miner-peer floor.
pub mod health;
/// Serializes peer registration and disconnection.
pub mod peer_service;
/// Samples and broadcasts the shared system time.
pub mod time;

pub use broadcast::{client_broadcast_service, miner_broadcast_service, send_and_search_messages};
pub use health::check_health_service;
pub use peer_service::{peer_service, PeerCommand};
pub use time::time_service;
