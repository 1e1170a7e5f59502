use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::connectivity::Connectivity;
use crate::error::{parse_error_message, ApiError};
use crate::headers::build_headers;
use crate::request::{ApiResponse, RequestSpec};
use crate::retry::CallContext;
use crate::session::Session;
use crate::url::join_api_url;

/// Endpoint that exchanges a refresh token for a new access token.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Uniform request dispatch with bearer credentials and silent refresh.
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: Arc<Session>,
    connectivity: Arc<dyn Connectivity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshGrant {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl ApiClient {
    pub fn new(
        config: ApiConfig,
        session: Arc<Session>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self, ApiError> {
        let base = join_api_url(&config.base_url, "");
        reqwest::Url::parse(&base).map_err(|error| ApiError::InvalidBaseUrl(format!("{base}: {error}")))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            http,
            config,
            session,
            connectivity,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn connectivity(&self) -> &Arc<dyn Connectivity> {
        &self.connectivity
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_api_url(&self.config.base_url, path)
    }

    pub fn build_headers(
        &self,
        spec: &RequestSpec,
        access_token: Option<&str>,
    ) -> Result<HeaderMap, ApiError> {
        let headers = build_headers(
            &self.config,
            &spec.headers,
            access_token,
            spec.body.is_some(),
        );
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| ApiError::InvalidHeader(format!("invalid header value for {key}")))?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        spec: &RequestSpec,
        access_token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let headers = self.build_headers(spec, access_token)?;
        let mut builder = self
            .http
            .request(spec.method.to_reqwest(), self.endpoint(&spec.path))
            .headers(headers);
        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }

    pub async fn send(&self, spec: &RequestSpec) -> Result<ApiResponse, ApiError> {
        self.send_with_context(spec, CallContext::initial()).await
    }

    /// Dispatch `spec`, refreshing the session once on a 401.
    ///
    /// The context flips to a retry after the first refresh, so a second 401
    /// surfaces as `RequestFailed` instead of refreshing again.
    pub async fn send_with_context(
        &self,
        spec: &RequestSpec,
        ctx: CallContext,
    ) -> Result<ApiResponse, ApiError> {
        let mut ctx = ctx;
        loop {
            match self.attempt(spec, ctx).await {
                Err(error) if error.is_unauthorized() && ctx.should_refresh_on_unauthorized() => {
                    tracing::debug!(method = %spec.method, path = %spec.path, "unauthorized, refreshing session");
                    self.refresh_session().await?;
                    ctx = ctx.into_retry();
                }
                other => return other,
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Any failure clears the session: a missing refresh token yields
    /// `SessionRequired`, a rejected one `SessionExpired`.
    pub async fn refresh_session(&self) -> Result<String, ApiError> {
        let Some(refresh_token) = self.session.refresh_token()? else {
            tracing::warn!("no refresh token stored, session required");
            self.clear_session();
            return Err(ApiError::SessionRequired);
        };

        match self.request_refresh(&refresh_token).await {
            Ok(grant) => {
                self.session
                    .replace_access_token(&grant.access_token, grant.refresh_token.as_deref())?;
                tracing::info!("access token refreshed");
                Ok(grant.access_token)
            }
            Err(error) => {
                tracing::warn!(%error, "token refresh failed, session expired");
                self.clear_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    async fn attempt(&self, spec: &RequestSpec, ctx: CallContext) -> Result<ApiResponse, ApiError> {
        if !self.connectivity.is_connected() {
            return Err(ApiError::NetworkUnavailable);
        }

        let access_token = self.session.access_token();
        let response = self
            .build_request(spec, access_token.as_deref())?
            .send()
            .await
            .map_err(ApiError::from);
        let result = match response {
            Ok(response) => read_response(response).await,
            Err(error) => Err(error),
        };

        match &result {
            Ok(response) => tracing::debug!(
                method = %spec.method,
                path = %spec.path,
                status = response.status,
                is_retry = ctx.is_retry,
                "request completed"
            ),
            Err(error) => tracing::debug!(
                method = %spec.method,
                path = %spec.path,
                status = error.status().map(|status| status.as_u16()),
                is_retry = ctx.is_retry,
                %error,
                "request failed"
            ),
        }
        result
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<RefreshGrant, ApiError> {
        let spec = RequestSpec::post(REFRESH_PATH, json!({ "refreshToken": refresh_token }));
        let response = self.build_request(&spec, None)?.send().await?;
        let response = read_response(response).await?;
        let grant = response.decode_data::<RefreshGrant>()?;
        if grant.access_token.trim().is_empty() {
            return Err(ApiError::request_failed(
                None,
                "refresh response carried an empty access token",
            ));
        }
        Ok(grant)
    }

    fn clear_session(&self) {
        if let Err(error) = self.session.clear() {
            tracing::warn!(%error, "failed to clear persisted session");
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

async fn read_response(response: Response) -> Result<ApiResponse, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = parse_error_message(Some(status), &body);
        return Err(ApiError::request_failed(Some(status), message));
    }

    let body = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).map_err(|error| {
            ApiError::request_failed(Some(status), format!("invalid JSON response body: {error}"))
        })?
    };
    Ok(ApiResponse {
        status: status.as_u16(),
        body,
    })
}
