use aqua_api::{ApiError, CallContext, RequestSpec, SessionCredentials, UserSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{fetch, to_body};
use crate::AquaClient;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const PROFILE_PATH: &str = "/users/profile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
}

/// Credential and profile calls.
///
/// Login and registration talk to the HTTP client directly: they are never
/// deferred and a 401 means bad credentials, not an expired session.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    client: &'a AquaClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a AquaClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionCredentials, ApiError> {
        let spec = RequestSpec::post(LOGIN_PATH, json!({ "email": email, "password": password }));
        self.authenticate(spec).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<SessionCredentials, ApiError> {
        let spec = RequestSpec::post(REGISTER_PATH, to_body(registration)?);
        self.authenticate(spec).await
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.session().clear()?;
        Ok(())
    }

    /// Reload the persisted session. Returns the user when a token was found.
    pub fn restore_session(&self) -> Result<Option<UserSummary>, ApiError> {
        let session = self.client.session();
        if session.restore()? {
            Ok(session.user())
        } else {
            Ok(None)
        }
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        fetch(self.client, RequestSpec::get(PROFILE_PATH)).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        fetch(self.client, RequestSpec::put(PROFILE_PATH, to_body(update)?)).await
    }

    async fn authenticate(&self, spec: RequestSpec) -> Result<SessionCredentials, ApiError> {
        let response = self
            .client
            .api()
            .send_with_context(&spec, CallContext::without_refresh())
            .await?;
        let credentials = response.decode_data::<SessionCredentials>()?;
        self.client.session().establish(&credentials)?;
        Ok(credentials)
    }
}
