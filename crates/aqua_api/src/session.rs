use std::sync::{Arc, PoisonError, RwLock};

use aqua_store::{
    get_json, set_json, KeyValueStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY,
};
use serde::{Deserialize, Serialize};

/// Authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Tokens and user returned by login, registration and restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    user: Option<UserSummary>,
}

/// Explicitly owned session shared by the HTTP client and the app layer.
///
/// The access token is mirrored in memory for every outgoing call; the
/// refresh token is only ever read from durable storage. Every write hits
/// storage first and swaps the in-memory copy afterwards, so readers see
/// either the previous token or the new one.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Load the persisted token and user into memory.
    ///
    /// Returns whether an access token was found.
    pub fn restore(&self) -> Result<bool, StoreError> {
        let access_token = self.store.get(ACCESS_TOKEN_KEY)?;
        let user = get_json::<UserSummary>(self.store.as_ref(), USER_KEY)?;
        let restored = access_token.is_some();

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.access_token = access_token;
        state.user = user;
        tracing::debug!(restored, "session restored from storage");
        Ok(restored)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .clone()
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(REFRESH_TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    #[must_use]
    pub fn user(&self) -> Option<UserSummary> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .is_some()
    }

    pub fn establish(&self, credentials: &SessionCredentials) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, &credentials.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &credentials.refresh_token)?;
        set_json(self.store.as_ref(), USER_KEY, &credentials.user)?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.access_token = Some(credentials.access_token.clone());
        state.user = Some(credentials.user.clone());
        tracing::info!(user_id = %credentials.user.id, "session established");
        Ok(())
    }

    /// Swap in a refreshed access token, and a rotated refresh token if the
    /// server issued one.
    pub fn replace_access_token(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.access_token = Some(access_token.to_owned());
        tracing::debug!(rotated_refresh = refresh_token.is_some(), "access token replaced");
        Ok(())
    }

    /// Drop the in-memory session, then every persisted credential.
    ///
    /// All keys are attempted even if one removal fails; the first error wins.
    pub fn clear(&self) -> Result<(), StoreError> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = SessionState::default();
        }

        let mut first_error = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(error) = self.store.remove(key) {
                first_error.get_or_insert(error);
            }
        }
        tracing::info!("session cleared");
        first_error.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
