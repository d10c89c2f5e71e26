//! Inactivity-based forced sign-out for administrator sessions.
//!
//! Ordinary sessions never expire through this mechanism: the guard only
//! arms when the current identity holds the admin role. While armed, a
//! sliding 30-minute window tracks activity signals; when it elapses the
//! guard wipes local caches and signs the session out.

use rihla_cache::{ChatHistoryStore, NamespaceCache, OFFLINE_CACHE_PREFIX};
use rihla_core::{AuthEvent, AuthGateway, UserRole};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Inactivity window after which an admin session is force-signed-out
pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Capacity of the activity-signal channel; signals only re-arm the timer,
/// so extras dropped while one is queued lose nothing
const ACTIVITY_CHANNEL_CAPACITY: usize = 32;

/// Configuration for a [`SessionGuard`]
#[derive(Debug, Clone)]
pub struct SessionGuardConfig {
    /// Sliding inactivity window; [`INACTIVITY_TIMEOUT`] unless overridden
    pub idle_timeout: Duration,
    /// Key prefix of the offline-asset entries purged at forced logout
    pub cache_prefix: String,
}

impl Default for SessionGuardConfig {
    fn default() -> Self {
        Self {
            idle_timeout: INACTIVITY_TIMEOUT,
            cache_prefix: OFFLINE_CACHE_PREFIX.to_string(),
        }
    }
}

/// Handle to an armed inactivity guard.
///
/// [`start`](Self::start) returns `None` when there is no session or the
/// identity is not elevated; in that case nothing was attached and the
/// session runs unlimited.
pub struct SessionGuard {
    activity_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SessionGuard {
    /// Check the current session and arm the guard if it is elevated.
    ///
    /// A failed role query is treated as not-elevated: a transient backend
    /// error must not lock an admin out, so the guard fails safe toward an
    /// unlimited session and logs the condition.
    pub async fn start(
        auth: Arc<dyn AuthGateway>,
        chat: ChatHistoryStore,
        assets: NamespaceCache,
        config: SessionGuardConfig,
    ) -> Option<SessionGuard> {
        let session = match auth.current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("No session; inactivity guard not armed");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Session lookup failed; inactivity guard not armed");
                return None;
            }
        };

        if !is_elevated(auth.as_ref(), &session.user_id).await {
            debug!(user_id = %session.user_id, "Session not elevated; unlimited duration");
            return None;
        }

        let (activity_tx, activity_rx) = mpsc::channel(ACTIVITY_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let auth_events = auth.auth_events();

        info!(
            user_id = %session.user_id,
            idle_secs = config.idle_timeout.as_secs(),
            "Inactivity guard armed for admin session"
        );

        let task = tokio::spawn(run_guard(
            auth,
            chat,
            assets,
            config,
            auth_events,
            activity_rx,
            shutdown_rx,
        ));

        Some(SessionGuard {
            activity_tx,
            shutdown_tx,
            task: Some(task),
        })
    }

    /// Report a qualifying activity signal (pointer-down, key-down,
    /// touch-start, scroll). Re-arms the sliding window.
    pub fn notify_activity(&self) {
        let _ = self.activity_tx.try_send(());
    }

    /// Detach the guard: cancel the timer and stop listening.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Role check that fails safe to "not elevated".
async fn is_elevated(auth: &dyn AuthGateway, user_id: &str) -> bool {
    match auth.has_role(user_id, UserRole::Admin).await {
        Ok(elevated) => elevated,
        Err(e) => {
            warn!(
                user_id = %user_id,
                error = %e,
                "Role check failed; treating session as not elevated"
            );
            false
        }
    }
}

async fn run_guard(
    auth: Arc<dyn AuthGateway>,
    chat: ChatHistoryStore,
    assets: NamespaceCache,
    config: SessionGuardConfig,
    mut auth_events: broadcast::Receiver<AuthEvent>,
    mut activity_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    // Armed from the start; `start` only spawns for elevated sessions
    let mut armed = true;
    let mut deadline = Instant::now() + config.idle_timeout;
    let mut auth_closed = false;
    let mut activity_closed = false;

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                debug!("Inactivity guard detached");
                break;
            }

            event = auth_events.recv(), if !auth_closed => match event {
                Ok(AuthEvent::SignedOut) => {
                    // The session is already gone; a stale forced logout
                    // must not fire after it
                    debug!("External sign-out observed; disarming");
                    armed = false;
                }
                Ok(AuthEvent::SignedIn(session)) => {
                    if is_elevated(auth.as_ref(), &session.user_id).await {
                        debug!(user_id = %session.user_id, "Sign-in observed; re-arming");
                        armed = true;
                        deadline = Instant::now() + config.idle_timeout;
                    } else {
                        armed = false;
                    }
                }
                Ok(AuthEvent::TokenRefreshed(_)) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => {
                    auth_closed = true;
                }
            },

            activity = activity_rx.recv(), if armed && !activity_closed => match activity {
                Some(()) => {
                    deadline = Instant::now() + config.idle_timeout;
                }
                None => {
                    activity_closed = true;
                }
            },

            () = sleep_until(deadline), if armed => {
                info!("Inactivity window elapsed; forcing sign-out");
                armed = false;
                force_logout(auth.as_ref(), &chat, &assets, &config.cache_prefix).await;
            }
        }
    }
}

/// Wipe local caches, then sign out.
///
/// Cache cleanup is best-effort; the sign-out proceeds regardless.
async fn force_logout(
    auth: &dyn AuthGateway,
    chat: &ChatHistoryStore,
    assets: &NamespaceCache,
    cache_prefix: &str,
) {
    chat.clear_all().await;
    let purged = assets.purge_prefix(cache_prefix).await;
    debug!(purged, "Purged offline caches before sign-out");

    if let Err(e) = auth.sign_out().await {
        warn!(error = %e, "Backend sign-out failed after inactivity timeout");
    }
}
