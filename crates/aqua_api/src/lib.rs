//! HTTP client primitives for the aquadiary REST API.
//!
//! This crate owns request dispatch, bearer credentials, the silent refresh
//! protocol and error normalization. It knows nothing about offline
//! deferral: a disconnected dispatch simply fails with
//! [`ApiError::NetworkUnavailable`] and the caller decides what to do.

pub mod client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod headers;
pub mod request;
pub mod retry;
pub mod session;
pub mod url;

pub use client::{ApiClient, REFRESH_PATH};
pub use config::ApiConfig;
pub use connectivity::{Connectivity, ConnectivitySignal};
pub use error::ApiError;
pub use request::{ApiResponse, HttpMethod, RequestSpec};
pub use retry::CallContext;
pub use session::{Session, SessionCredentials, UserSummary};
pub use url::join_api_url;
