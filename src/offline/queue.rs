use std::sync::{Arc, Mutex, PoisonError};

use aqua_api::RequestSpec;
use aqua_store::{get_json, set_json, KeyValueStore, StoreError, OFFLINE_QUEUE_KEY};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// A deferred request as it is persisted across restarts.
///
/// The id is minted per enqueue, so two identical specs queued twice are two
/// distinct entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub id: Uuid,
    pub request: RequestSpec,
    pub queued_at: String,
}

impl PendingRequest {
    pub fn new(request: RequestSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            queued_at: timestamp_now(),
        }
    }
}

fn timestamp_now() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Durable FIFO snapshot of deferred requests under [`OFFLINE_QUEUE_KEY`].
///
/// The whole list is rewritten on every mutation. Entries stay in the
/// snapshot until [`OfflineQueue::acknowledge`] confirms a terminal replay
/// outcome, so a crash mid-replay re-delivers them on the next start.
pub struct OfflineQueue {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn enqueue(&self, pending: &PendingRequest) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.push(pending.clone());
        self.save(&entries)
    }

    pub fn peek_all(&self) -> Result<Vec<PendingRequest>, StoreError> {
        self.load()
    }

    /// Every stored entry, in order, left in place until acknowledged.
    pub fn drain(&self) -> Result<Vec<PendingRequest>, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    /// Remove the entry with `id`. Returns whether it was present.
    pub fn acknowledge(&self, id: Uuid) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove(OFFLINE_QUEUE_KEY)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.load()?.is_empty())
    }

    /// An unreadable snapshot is dropped so deferral keeps working.
    fn load(&self) -> Result<Vec<PendingRequest>, StoreError> {
        match get_json::<Vec<PendingRequest>>(self.store.as_ref(), OFFLINE_QUEUE_KEY) {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(error @ StoreError::JsonParse { .. }) => {
                tracing::warn!(%error, "discarding unreadable offline queue snapshot");
                self.store.remove(OFFLINE_QUEUE_KEY)?;
                Ok(Vec::new())
            }
            Err(error) => Err(error),
        }
    }

    fn save(&self, entries: &[PendingRequest]) -> Result<(), StoreError> {
        if entries.is_empty() {
            self.store.remove(OFFLINE_QUEUE_KEY)
        } else {
            set_json(self.store.as_ref(), OFFLINE_QUEUE_KEY, entries)
        }
    }
}

impl std::fmt::Debug for OfflineQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineQueue").finish_non_exhaustive()
    }
}
