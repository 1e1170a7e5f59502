use tokio::sync::watch;

/// Reachability as reported by the platform network-status provider.
pub trait Connectivity: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Receiver that observes every connected/disconnected transition.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity state fed by the embedding platform.
///
/// Subscribers are woken only when the value actually changes.
#[derive(Debug)]
pub struct ConnectivitySignal {
    tx: watch::Sender<bool>,
}

impl ConnectivitySignal {
    #[must_use]
    pub fn new(connected: bool) -> Self {
        let (tx, _rx) = watch::channel(connected);
        Self { tx }
    }

    /// Publish the latest reachability. Returns whether this was a transition.
    pub fn set_connected(&self, connected: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == connected {
                false
            } else {
                *current = connected;
                true
            }
        });
        if changed {
            tracing::info!(connected, "connectivity changed");
        }
        changed
    }
}

impl Default for ConnectivitySignal {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivitySignal {
    fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
