//! `TimeService` (§4.5): samples wall-clock time into a shared value on one
//! interval and broadcasts a time-sync packet to miner peers on another,
//! longer one.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{instrument, trace};

use crate::message::NetworkMessage;

/// The wall-clock value `TimeService` keeps fresh; other services read it
/// instead of calling the OS clock directly so every reader sees the same
/// value between samples.
pub type SharedSystemTime = Arc<AtomicI64>;

/// Builds a shared system-time cell seeded with `now`.
pub fn shared_system_time(now: i64) -> SharedSystemTime {
    Arc::new(AtomicI64::new(now))
}

/// Reads the current sample.
pub fn read_system_time(shared: &SharedSystemTime) -> i64 {
    shared.load(Ordering::Relaxed)
}

/// Runs forever: every `update_sys_time_secs` seconds, stores `now()`'s
/// value into `shared`; every `time_broadcast_interval_secs` seconds,
/// encodes a [`NetworkMessage::TimeSync`] from the latest sample and sends
/// it to the miner-broadcast channel (§4.5, §6).
#[instrument(skip(shared, miner_broadcast, now))]
pub async fn time_service(
    shared: SharedSystemTime,
    update_sys_time_secs: u64,
    time_broadcast_interval_secs: u64,
    miner_broadcast: mpsc::Sender<Vec<u8>>,
    now: impl Fn() -> i64 + Send + Sync + 'static,
) {
    let mut sample_interval = tokio::time::interval(Duration::from_secs(update_sys_time_secs.max(1)));
    let mut broadcast_interval = tokio::time::interval(Duration::from_secs(time_broadcast_interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = sample_interval.tick() => {
                let value = now();
                shared.store(value, Ordering::Relaxed);
                trace!(unix_time = value, "system time sampled");
            }
            _ = broadcast_interval.tick() => {
                let msg = NetworkMessage::TimeSync { unix_time: read_system_time(&shared) };
                if let Ok(bytes) = msg.encode() {
                    let _ = miner_broadcast.send(bytes).await;
                }
            }
        }
    }
}
