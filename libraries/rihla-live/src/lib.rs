//! Real-time synchronization core for the Rihla dashboard.
//!
//! Three independent utilities compose into page-level containers:
//!
//! - [`RealtimeBridge`]: bridges a backend change feed and a focus-regain
//!   signal into one debounced "data may be stale, refetch" callback.
//! - [`DashboardCoordinator`]: fetches role-specific dashboard snapshots,
//!   de-duplicating in-flight requests and exposing `{data, error,
//!   is_loading}` through a watch channel.
//! - [`SessionGuard`]: forces sign-out of administrator sessions after an
//!   inactivity window, wiping local caches on the way out.
//!
//! None of them share state; each owns its subscription, latch, and timer.
//! The backend arrives as `Arc<dyn …>` capabilities from `rihla-core`, so
//! tests substitute in-memory fakes.

#![forbid(unsafe_code)]

mod bridge;
mod coordinator;
mod session_guard;

pub use bridge::{BridgeConfig, RealtimeBridge, DEBOUNCE_INTERVAL};
pub use coordinator::{CoordinatorInputs, DashboardCoordinator};
pub use session_guard::{SessionGuard, SessionGuardConfig, INACTIVITY_TIMEOUT};
