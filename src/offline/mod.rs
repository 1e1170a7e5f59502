//! Deferral and replay of offline-safe requests.
//!
//! [`OfflineQueue`] is the durable snapshot; [`OfflineManager`] owns the
//! in-memory queue, the caller completion handles and the flush protocol.

mod manager;
mod queue;

pub use manager::{FlushReport, OfflineManager, ReplayOutcome, Responder};
pub use queue::{OfflineQueue, PendingRequest};
