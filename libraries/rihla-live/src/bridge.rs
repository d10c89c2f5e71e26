//! Change-feed to refetch bridge.
//!
//! Subscribes to one resource's change feed and collapses event bursts into
//! a single callback invocation fired after a quiescence window. A focus
//! regain signal feeds the same debounce path, so callers treat both as
//! "data may be stale".

use rihla_core::{ChangeEvent, ChangeFeed};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Quiescence window for change-feed events. Bursts of row changes (an
/// insert followed immediately by its update) produce one refetch, fired
/// this long after the last event.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(300);

/// Capacity of the focus-signal channel; signals only re-arm the debounce,
/// so dropping extras while one is queued loses nothing
const FOCUS_CHANNEL_CAPACITY: usize = 8;

type RefetchFn = Box<dyn Fn() + Send + 'static>;

/// Configuration for a [`RealtimeBridge`]
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Backend resource whose change feed to watch
    pub resource: String,
    /// When false, no subscription is created and the bridge is inert
    pub enabled: bool,
    /// Whether a focus-regain signal also schedules the callback
    pub refetch_on_focus: bool,
    /// Quiescence window; [`DEBOUNCE_INTERVAL`] unless overridden
    pub quiescence: Duration,
}

impl BridgeConfig {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            enabled: true,
            refetch_on_focus: true,
            quiescence: DEBOUNCE_INTERVAL,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn without_focus_refetch(mut self) -> Self {
        self.refetch_on_focus = false;
        self
    }
}

/// Debounced subscription-to-refetch bridge.
///
/// Holds the latest caller-supplied callback in a swappable cell, so
/// [`set_callback`](Self::set_callback) never re-creates the subscription.
/// Dropping the bridge (or calling [`shutdown`](Self::shutdown)) tears the
/// subscription down and cancels any pending firing; no callback runs
/// afterwards.
pub struct RealtimeBridge {
    callback: Arc<Mutex<RefetchFn>>,
    focus_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RealtimeBridge {
    /// Subscribe to the configured resource and start the debounce loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: BridgeConfig,
        feed: &dyn ChangeFeed,
        callback: impl Fn() + Send + 'static,
    ) -> Self {
        let callback: Arc<Mutex<RefetchFn>> = Arc::new(Mutex::new(Box::new(callback)));
        let (focus_tx, focus_rx) = mpsc::channel(FOCUS_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = if config.enabled {
            let events = feed.subscribe(&config.resource);
            debug!(resource = %config.resource, "Realtime bridge attached");
            Some(tokio::spawn(run_bridge(
                config,
                events,
                focus_rx,
                shutdown_rx,
                Arc::clone(&callback),
            )))
        } else {
            None
        };

        Self {
            callback,
            focus_tx,
            shutdown_tx,
            task,
        }
    }

    /// Swap in the latest callback without disturbing the subscription.
    pub fn set_callback(&self, callback: impl Fn() + Send + 'static) {
        let mut cell = match self.callback.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cell = Box::new(callback);
    }

    /// Signal that the tab/window regained focus.
    ///
    /// Schedules the debounced callback when `refetch_on_focus` is set;
    /// otherwise ignored.
    pub fn notify_focus(&self) {
        let _ = self.focus_tx.try_send(());
    }

    /// Tear the bridge down and wait for the loop to finish.
    ///
    /// Any pending debounce timer is cancelled; the callback will not fire
    /// again after this returns.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

// Dropping the handle drops the shutdown sender, which the loop observes
// and exits on; no explicit Drop impl is needed.

async fn run_bridge(
    config: BridgeConfig,
    mut events: broadcast::Receiver<ChangeEvent>,
    mut focus_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
    callback: Arc<Mutex<RefetchFn>>,
) {
    let mut deadline: Option<Instant> = None;
    let mut feed_closed = false;
    let mut focus_closed = false;

    loop {
        tokio::select! {
            // Shutdown wins over a timer that became ready at the same time
            biased;

            _ = shutdown_rx.changed() => {
                debug!(resource = %config.resource, "Realtime bridge detached");
                break;
            }

            event = events.recv(), if !feed_closed => match event {
                Ok(event) => {
                    trace!(resource = %config.resource, kind = ?event.kind, "Change event; debouncing");
                    deadline = Some(Instant::now() + config.quiescence);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // Missed events still mean the data is stale
                    trace!(resource = %config.resource, missed, "Change feed lagged");
                    deadline = Some(Instant::now() + config.quiescence);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    feed_closed = true;
                }
            },

            focus = focus_rx.recv(), if config.refetch_on_focus && !focus_closed => match focus {
                Some(()) => {
                    trace!(resource = %config.resource, "Focus regained; debouncing");
                    deadline = Some(Instant::now() + config.quiescence);
                }
                None => {
                    focus_closed = true;
                }
            },

            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                let cell = match callback.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                (*cell)();
            }
        }
    }
}
