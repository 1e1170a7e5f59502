use std::sync::{Arc, Mutex, PoisonError};

use aqua_api::{ApiClient, ApiConfig, ApiError, ApiResponse, Connectivity, RequestSpec, Session};
use aqua_store::{FileStore, KeyValueStore};
use tokio::task::JoinHandle;

use crate::config::EnvConfig;
use crate::offline::{FlushReport, OfflineManager, OfflineQueue};
use crate::resources::{Aquariums, Auth, Events, Inhabitants, Timeline, WaterParameters};

/// Entry point for the app layer.
///
/// Wires one [`Session`], the HTTP client and the offline queue over a
/// single durable store, and exposes the typed resource APIs.
pub struct AquaClient {
    api: Arc<ApiClient>,
    offline: Arc<OfflineManager>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AquaClient {
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn KeyValueStore>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self, ApiError> {
        let session = Arc::new(Session::new(Arc::clone(&store)));
        let api = Arc::new(ApiClient::new(config, session, connectivity)?);
        let offline = Arc::new(OfflineManager::new(
            Arc::clone(&api),
            OfflineQueue::new(store),
        ));
        Ok(Self {
            api,
            offline,
            listener: Mutex::new(None),
        })
    }

    /// Client backed by a [`FileStore`] under the configured data directory.
    pub fn open(env: &EnvConfig, connectivity: Arc<dyn Connectivity>) -> Result<Self, ApiError> {
        let store = FileStore::open(&env.store_root())?;
        tracing::debug!(root = %store.root().display(), "opened durable store");
        Self::new(env.api_config(), Arc::new(store), connectivity)
    }

    /// Restore the persisted session, start listening for connectivity
    /// transitions and replay whatever the previous run left queued.
    pub async fn start(&self) -> Result<FlushReport, ApiError> {
        let authenticated = self.api.session().restore()?;
        tracing::info!(authenticated, "client starting");
        self.ensure_listener();
        self.offline.restore().await
    }

    /// Single dispatch entry point. See [`OfflineManager::send`].
    pub async fn send(
        &self,
        spec: RequestSpec,
        offline_safe: bool,
    ) -> Result<ApiResponse, ApiError> {
        self.offline.send(spec, offline_safe).await
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn session(&self) -> &Arc<Session> {
        self.api.session()
    }

    pub fn offline(&self) -> &Arc<OfflineManager> {
        &self.offline
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn aquariums(&self) -> Aquariums<'_> {
        Aquariums::new(self)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    pub fn inhabitants(&self) -> Inhabitants<'_> {
        Inhabitants::new(self)
    }

    pub fn water_parameters(&self) -> WaterParameters<'_> {
        WaterParameters::new(self)
    }

    pub fn timeline(&self) -> Timeline<'_> {
        Timeline::new(self)
    }

    fn ensure_listener(&self) {
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if listener.is_none() {
            *listener = Some(self.offline.spawn_connectivity_listener());
        }
    }
}

impl Drop for AquaClient {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = listener.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for AquaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AquaClient")
            .field("api", &self.api)
            .field("offline", &self.offline)
            .finish_non_exhaustive()
    }
}
