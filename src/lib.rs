//! Client core of the aquadiary aquarium journal.
//!
//! Every call goes through one dispatch path: [`AquaClient::send`] attaches
//! the session's bearer token, silently refreshes it once on a 401, and
//! defers offline-safe requests while the device is offline. Deferred
//! requests are persisted and replayed in order when connectivity returns,
//! including after a restart.
//!
//! # Public API Overview
//! - Build an [`AquaClient`] over a [`KeyValueStore`] and a [`Connectivity`]
//!   source, then call [`AquaClient::start`] once.
//! - Use the typed resources ([`AquaClient::auth`], [`AquaClient::aquariums`],
//!   [`AquaClient::events`], ...) or [`AquaClient::send`] with a raw
//!   [`RequestSpec`].
//! - Observe replays of restored requests via
//!   [`OfflineManager::subscribe_outcomes`].

pub mod client;
pub mod config;
pub mod logging;
pub mod offline;
pub mod resources;

pub use crate::client::AquaClient;
pub use crate::config::EnvConfig;
pub use crate::logging::{init_logging, LoggingError};
pub use crate::offline::{
    FlushReport, OfflineManager, OfflineQueue, PendingRequest, ReplayOutcome,
};

pub use aqua_api::{
    ApiClient, ApiConfig, ApiError, ApiResponse, CallContext, Connectivity, ConnectivitySignal,
    HttpMethod, RequestSpec, Session, SessionCredentials, UserSummary,
};
pub use aqua_store::{FileStore, KeyValueStore, MemoryStore, StoreError};
