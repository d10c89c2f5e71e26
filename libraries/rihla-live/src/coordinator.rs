//! Role-scoped dashboard fetch coordination.
//!
//! One coordinator instance owns one dashboard view's fetch lifecycle:
//! idle → loading → {success | soft-cancelled | error} → idle. An in-flight
//! latch drops refetches requested while one is outstanding, so a storm of
//! change-feed triggers produces at most one concurrent backend call.

use rihla_core::{DashboardApi, DashboardPayload, DashboardRole, FetchState};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};

type ErrorFn = Box<dyn Fn(&str) + Send + 'static>;

/// Effective inputs of a coordinator.
///
/// Influencer and team dashboards need a subject id; the admin dashboard is
/// global and ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorInputs {
    pub role: DashboardRole,
    pub subject_id: Option<String>,
    pub enabled: bool,
}

impl CoordinatorInputs {
    pub fn influencer(subject_id: impl Into<String>) -> Self {
        Self {
            role: DashboardRole::Influencer,
            subject_id: Some(subject_id.into()),
            enabled: true,
        }
    }

    pub fn team(subject_id: impl Into<String>) -> Self {
        Self {
            role: DashboardRole::Team,
            subject_id: Some(subject_id.into()),
            enabled: true,
        }
    }

    pub fn admin() -> Self {
        Self {
            role: DashboardRole::Admin,
            subject_id: None,
            enabled: true,
        }
    }

    /// Same inputs with no subject id (e.g., not yet known)
    pub fn without_subject(mut self) -> Self {
        self.subject_id = None;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether these inputs allow a fetch at all
    fn fetchable(&self) -> bool {
        self.enabled && (!self.role.requires_subject() || self.subject_id.is_some())
    }
}

/// Fetches one of the three role-specific dashboard snapshots and exposes
/// `{data, error, is_loading}` plus `refetch`.
///
/// The optional error callback lives in a swappable cell
/// ([`set_on_error`](Self::set_on_error)), so replacing it neither changes
/// `refetch` behavior nor re-triggers a fetch.
pub struct DashboardCoordinator {
    api: Arc<dyn DashboardApi>,
    inputs: Mutex<CoordinatorInputs>,
    state_tx: Arc<watch::Sender<FetchState>>,
    in_flight: Arc<AtomicBool>,
    /// Bumped on every input change; completions from an older generation
    /// are discarded instead of landing in state
    generation: Arc<AtomicU64>,
    on_error: Arc<Mutex<Option<ErrorFn>>>,
}

impl DashboardCoordinator {
    /// Create a coordinator and trigger the initial fetch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(api: Arc<dyn DashboardApi>, inputs: CoordinatorInputs) -> Self {
        let (state_tx, _) = watch::channel(FetchState::default());
        let coordinator = Self {
            api,
            inputs: Mutex::new(inputs),
            state_tx: Arc::new(state_tx),
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            on_error: Arc::new(Mutex::new(None)),
        };
        coordinator.refetch();
        coordinator
    }

    /// Current fetch state snapshot
    pub fn state(&self) -> FetchState {
        self.state_tx.borrow().clone()
    }

    /// Observe fetch-state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<FetchState> {
        self.state_tx.subscribe()
    }

    /// Install or replace the error side-effect callback
    pub fn set_on_error(&self, callback: impl Fn(&str) + Send + 'static) {
        let mut cell = lock_unpoisoned(&self.on_error);
        *cell = Some(Box::new(callback));
    }

    /// Replace the effective inputs.
    ///
    /// A change discards any in-flight completion (generation bump), resets
    /// state, and triggers one fetch. Setting identical inputs is a no-op.
    pub fn set_inputs(&self, inputs: CoordinatorInputs) {
        {
            let mut current = lock_unpoisoned(&self.inputs);
            if *current == inputs {
                return;
            }
            *current = inputs;
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        // The stale fetch no longer counts as in flight; its completion is
        // dropped by the generation check
        self.in_flight.store(false, Ordering::SeqCst);
        self.state_tx.send_replace(FetchState::default());
        self.refetch();
    }

    /// Fetch the dashboard for the current inputs.
    ///
    /// No-op when disabled, when the role needs a subject id and none is
    /// set, or while a fetch is already in flight (dropped, not queued).
    pub fn refetch(&self) {
        let inputs = lock_unpoisoned(&self.inputs).clone();
        if !inputs.fetchable() {
            debug!(role = ?inputs.role, enabled = inputs.enabled, "Refetch skipped: not fetchable");
            return;
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!(role = ?inputs.role, "Refetch dropped: fetch already in flight");
            return;
        }

        let fetch_generation = self.generation.load(Ordering::SeqCst);
        self.state_tx.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let api = Arc::clone(&self.api);
        let state_tx = Arc::clone(&self.state_tx);
        let in_flight = Arc::clone(&self.in_flight);
        let generation = Arc::clone(&self.generation);
        let on_error = Arc::clone(&self.on_error);

        tokio::spawn(async move {
            let result = fetch_for_role(&*api, &inputs).await;

            if generation.load(Ordering::SeqCst) != fetch_generation {
                debug!(role = ?inputs.role, "Discarding stale fetch completion");
                return;
            }
            in_flight.store(false, Ordering::SeqCst);

            match result {
                Ok(payload) => {
                    debug!(role = ?inputs.role, "Dashboard fetch succeeded");
                    state_tx.send_modify(|state| {
                        state.data = Some(payload);
                        state.error = None;
                        state.is_loading = false;
                    });
                }
                Err(e) if e.is_cancellation() => {
                    // Superseded request; not a user-facing failure
                    debug!(role = ?inputs.role, "Dashboard fetch cancelled");
                    state_tx.send_modify(|state| state.is_loading = false);
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(role = ?inputs.role, error = %message, "Dashboard fetch failed");
                    state_tx.send_modify(|state| {
                        state.error = Some(message.clone());
                        state.is_loading = false;
                    });
                    if let Some(callback) = lock_unpoisoned(&on_error).as_ref() {
                        callback(&message);
                    }
                }
            }
        });
    }
}

/// Issue the one backend call appropriate to the role.
async fn fetch_for_role(
    api: &dyn DashboardApi,
    inputs: &CoordinatorInputs,
) -> rihla_core::Result<DashboardPayload> {
    match (inputs.role, inputs.subject_id.as_deref()) {
        (DashboardRole::Influencer, Some(id)) => api
            .fetch_influencer_dashboard(id)
            .await
            .map(DashboardPayload::Influencer),
        (DashboardRole::Team, Some(id)) => {
            api.fetch_team_dashboard(id).await.map(DashboardPayload::Team)
        }
        (DashboardRole::Admin, _) => {
            api.fetch_admin_dashboard().await.map(DashboardPayload::Admin)
        }
        // Guarded by `fetchable` before spawning
        _ => Err(rihla_core::RihlaError::invalid_input(
            "subject id required for this role",
        )),
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
