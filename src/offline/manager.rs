use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aqua_api::{ApiClient, ApiError, ApiResponse, RequestSpec};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::queue::{OfflineQueue, PendingRequest};

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// Completion handle of the caller that deferred a request.
pub type Responder = oneshot::Sender<Result<ApiResponse, ApiError>>;

/// Terminal result of one replayed request, keyed by its queue id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub id: Uuid,
    /// Response status on success, the failure message otherwise.
    pub result: Result<u16, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Items that reached a terminal outcome.
    pub replayed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Items put back because connectivity dropped mid-flush.
    pub requeued: usize,
}

struct QueuedItem {
    pending: PendingRequest,
    responder: Option<Responder>,
}

#[derive(Default)]
struct QueueState {
    queued: VecDeque<QueuedItem>,
    in_flight: HashSet<Uuid>,
}

struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Defers offline-safe requests that failed for lack of connectivity and
/// replays them once the connection is back.
pub struct OfflineManager {
    client: Arc<ApiClient>,
    repository: OfflineQueue,
    state: Mutex<QueueState>,
    flushing: AtomicBool,
    outcomes: broadcast::Sender<ReplayOutcome>,
}

impl OfflineManager {
    pub fn new(client: Arc<ApiClient>, repository: OfflineQueue) -> Self {
        let (outcomes, _rx) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            client,
            repository,
            state: Mutex::new(QueueState::default()),
            flushing: AtomicBool::new(false),
            outcomes,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn repository(&self) -> &OfflineQueue {
        &self.repository
    }

    /// Dispatch `spec`, deferring it when it is offline-safe and the device
    /// is offline.
    ///
    /// A deferred call stays pending until a flush replays it. Every other
    /// failure is returned as-is and leaves the queue untouched.
    pub async fn send(
        &self,
        spec: RequestSpec,
        offline_safe: bool,
    ) -> Result<ApiResponse, ApiError> {
        match self.client.send(&spec).await {
            Err(ApiError::NetworkUnavailable) if offline_safe => {
                let (tx, rx) = oneshot::channel();
                let pending = self.enqueue(spec, Some(tx))?;
                tracing::info!(
                    id = %pending.id,
                    method = %pending.request.method,
                    path = %pending.request.path,
                    "offline, request deferred"
                );
                // Connectivity may have returned after the failed attempt.
                if self.client.connectivity().is_connected() {
                    self.flush().await;
                }
                rx.await.map_err(|_| ApiError::Cancelled)?
            }
            other => other,
        }
    }

    /// Append `spec` to the queue and persist the snapshot.
    ///
    /// Nothing is queued in memory when the snapshot cannot be written.
    pub fn enqueue(
        &self,
        spec: RequestSpec,
        responder: Option<Responder>,
    ) -> Result<PendingRequest, ApiError> {
        let pending = PendingRequest::new(spec);
        let mut state = self.lock_state();
        self.repository.enqueue(&pending)?;
        state.queued.push_back(QueuedItem {
            pending: pending.clone(),
            responder,
        });
        tracing::debug!(id = %pending.id, queued = state.queued.len(), "request enqueued");
        Ok(pending)
    }

    /// Replay every queued request in FIFO order.
    ///
    /// Only one flush runs at a time; a concurrent call returns an empty
    /// report. Requests enqueued while a flush is replaying are picked up by
    /// the running flush as long as the device stays connected.
    pub async fn flush(&self) -> FlushReport {
        let mut report = FlushReport::default();
        loop {
            if !self.client.connectivity().is_connected() {
                break;
            }
            if self.flushing.swap(true, Ordering::AcqRel) {
                tracing::debug!("flush already running");
                break;
            }
            {
                let _guard = FlushGuard(&self.flushing);
                while report.requeued == 0 && self.client.connectivity().is_connected() {
                    let batch = self.take_batch();
                    if batch.is_empty() {
                        break;
                    }
                    tracing::info!(count = batch.len(), "flushing offline queue");
                    self.replay_batch(batch, &mut report).await;
                }
            }
            // An enqueue that raced the flag release saw a running flush.
            if report.requeued > 0 || self.is_empty() {
                break;
            }
        }

        if report != FlushReport::default() {
            tracing::info!(
                replayed = report.replayed,
                succeeded = report.succeeded,
                failed = report.failed,
                requeued = report.requeued,
                "offline queue flushed"
            );
        }
        report
    }

    /// Reload the persisted snapshot and flush when connected.
    ///
    /// Restored items have no caller waiting; their results are only visible
    /// through [`OfflineManager::subscribe_outcomes`]. Entries already queued
    /// or in flight are skipped, so restoring twice never duplicates work.
    pub async fn restore(&self) -> Result<FlushReport, ApiError> {
        let restored = {
            // Held across the read so a concurrent acknowledge cannot slip in
            // between the snapshot and the in-flight check.
            let mut state = self.lock_state();
            let stored = self.repository.drain()?;
            let mut known = state
                .queued
                .iter()
                .map(|item| item.pending.id)
                .chain(state.in_flight.iter().copied())
                .collect::<HashSet<_>>();
            let mut restored = 0;
            for pending in stored {
                if known.insert(pending.id) {
                    state.queued.push_back(QueuedItem {
                        pending,
                        responder: None,
                    });
                    restored += 1;
                }
            }
            restored
        };
        tracing::info!(restored, "offline queue restored");

        Ok(self.flush().await)
    }

    pub fn len(&self) -> usize {
        self.lock_state().queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().queued.is_empty()
    }

    /// Queued requests in replay order.
    pub fn pending(&self) -> Vec<PendingRequest> {
        self.lock_state()
            .queued
            .iter()
            .map(|item| item.pending.clone())
            .collect()
    }

    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<ReplayOutcome> {
        self.outcomes.subscribe()
    }

    /// Flush on every transition to connected.
    pub fn spawn_connectivity_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let mut connectivity = manager.client.connectivity().subscribe();
        tokio::spawn(async move {
            while connectivity.changed().await.is_ok() {
                let connected = *connectivity.borrow_and_update();
                if connected {
                    manager.flush().await;
                }
            }
        })
    }

    fn take_batch(&self) -> Vec<QueuedItem> {
        let mut state = self.lock_state();
        let batch = state.queued.drain(..).collect::<Vec<_>>();
        for item in &batch {
            state.in_flight.insert(item.pending.id);
        }
        batch
    }

    /// Replay `batch` in order. Stops at the first `NetworkUnavailable` and
    /// puts that item and the rest back at the head of the queue.
    async fn replay_batch(&self, batch: Vec<QueuedItem>, report: &mut FlushReport) {
        let mut remaining = batch.into_iter();
        while let Some(item) = remaining.next() {
            let result = self.client.send(&item.pending.request).await;

            if matches!(result, Err(ApiError::NetworkUnavailable)) {
                let mut requeue = vec![item];
                requeue.extend(remaining.by_ref());
                report.requeued += requeue.len();

                let mut state = self.lock_state();
                for item in requeue.into_iter().rev() {
                    state.in_flight.remove(&item.pending.id);
                    state.queued.push_front(item);
                }
                tracing::warn!(requeued = report.requeued, "connectivity lost during flush");
                return;
            }

            report.replayed += 1;
            if result.is_ok() {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
            self.settle(item, result);
        }
    }

    fn settle(&self, item: QueuedItem, result: Result<ApiResponse, ApiError>) {
        let QueuedItem { pending, responder } = item;

        if let Err(error) = self.repository.acknowledge(pending.id) {
            tracing::warn!(id = %pending.id, %error, "failed to acknowledge replayed request");
        }
        self.lock_state().in_flight.remove(&pending.id);

        let outcome = ReplayOutcome {
            id: pending.id,
            result: match &result {
                Ok(response) => Ok(response.status),
                Err(error) => Err(error.to_string()),
            },
        };
        match &outcome.result {
            Ok(status) => tracing::debug!(id = %pending.id, status, "replayed request completed"),
            Err(message) => {
                tracing::warn!(id = %pending.id, error = %message, "replayed request failed")
            }
        }
        let _ = self.outcomes.send(outcome);

        if let Some(responder) = responder {
            let _ = responder.send(result);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for OfflineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineManager")
            .field("queued", &self.len())
            .field("flushing", &self.flushing.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
