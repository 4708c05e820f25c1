#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! # corechain-network
//!
//! The P2P overlay (§4.5, C5): a peer registry mutated by a single owning
//! task, a pair of broadcast services, a delayed-delivery service, and the
//! health/time background loops, all communicating over bounded `tokio`
//! channels rather than goroutines + raw mutexes.

/// Tunable system parameters (§6).
pub mod config;
/// The connection seam low-level socket framing is explicitly out of scope
/// for (§1 Non-goals).
pub mod connector;
/// Network-layer error type.
pub mod error;
/// Control-plane wire messages the overlay itself originates.
pub mod message;
/// A single registered peer and its outbound channel.
pub mod peer;
/// The process-wide peer registry.
pub mod peer_table;
/// The long-lived cooperative services (§4.5, §5).
pub mod services;
/// Per-peer delayed-message queues.
pub mod sending_map;

pub use config::{health_interval_secs, NetworkConfig};
pub use connector::PeerConnector;
pub use error::NetworkError;
pub use message::NetworkMessage;
pub use peer::{PeerHandle, PeerType, OUTBOUND_CHANNEL_CAPACITY};
pub use peer_table::PeerTable;
pub use sending_map::{SendingMap, DELAYED_QUEUE_CAPACITY};
