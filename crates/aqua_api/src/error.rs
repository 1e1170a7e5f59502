use std::fmt;

use aqua_store::StoreError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

/// Shown when neither the server nor the transport produced a message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Debug)]
pub enum ApiError {
    /// Connectivity signal reported disconnected at dispatch time.
    NetworkUnavailable,
    /// A 401 arrived and no refresh token was stored.
    SessionRequired,
    /// The refresh endpoint rejected the stored refresh token.
    SessionExpired,
    /// Any other HTTP or transport failure.
    RequestFailed {
        status: Option<StatusCode>,
        message: String,
    },
    InvalidBaseUrl(String),
    InvalidHeader(String),
    Storage(StoreError),
    Serde(JsonError),
    /// A deferred call lost its outcome channel before it was replayed.
    Cancelled,
}

impl ApiError {
    pub fn request_failed(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn is_network_unavailable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable)
    }

    /// Session errors mean the caller has to authenticate again.
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionRequired | Self::SessionExpired)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnavailable => write!(
                f,
                "No network connection. Check your connection and try again."
            ),
            Self::SessionRequired => write!(f, "Authorization required."),
            Self::SessionExpired => write!(f, "Session expired. Please log in again."),
            Self::RequestFailed { message, .. } => write!(f, "{message}"),
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Storage(error) => write!(f, "storage error: {error}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Cancelled => write!(f, "request was cancelled before it could be replayed"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::RequestFailed {
            status: error.status(),
            message: transport_message(&error),
        }
    }
}

impl From<JsonError> for ApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::Storage(error)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    Text(String),
    List(Vec<String>),
}

impl ErrorMessage {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Text(text) => text,
            Self::List(items) => items
                .into_iter()
                .filter(|item| !item.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        non_empty_string(&text).map(str::to_owned)
    }
}

/// Human-readable message for a non-success HTTP response.
///
/// Priority: the server `message` field, then the transport-level status
/// message, then [`GENERIC_FAILURE_MESSAGE`].
pub fn parse_error_message(status: Option<StatusCode>, body: &str) -> String {
    let server_message = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.message)
        .and_then(ErrorMessage::into_text);
    if let Some(message) = server_message {
        return message;
    }

    match status {
        Some(status) => format!("Request failed with status code {}", status.as_u16()),
        None => GENERIC_FAILURE_MESSAGE.to_owned(),
    }
}

fn transport_message(error: &reqwest::Error) -> String {
    let message = if error.is_timeout() {
        "request timed out".to_owned()
    } else {
        error.to_string()
    };
    non_empty_string(&message)
        .map(str::to_owned)
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned())
}

fn non_empty_string(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
