/// Backend capability traits for the Rihla client
///
/// Every component takes these as explicit dependencies (`Arc<dyn …>`), so a
/// test can substitute an in-memory fake for the hosted backend.
use crate::error::Result;
use crate::types::{
    AdminDashboard, AuthEvent, ChangeEvent, InfluencerDashboard, Session, TeamDashboard, UserRole,
};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Role-scoped dashboard fetchers.
///
/// Each call returns a fresh snapshot or an error, never both. Implementers
/// are serverless function endpoints on the hosted backend.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Fetch the dashboard snapshot for one influencer
    async fn fetch_influencer_dashboard(&self, influencer_id: &str) -> Result<InfluencerDashboard>;

    /// Fetch the dashboard snapshot for one partner/agent team
    async fn fetch_team_dashboard(&self, team_id: &str) -> Result<TeamDashboard>;

    /// Fetch the program-wide admin dashboard
    async fn fetch_admin_dashboard(&self) -> Result<AdminDashboard>;
}

/// Auth and session queries against the hosted backend.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Current session, if one exists
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Whether the identity holds the given privilege role
    async fn has_role(&self, user_id: &str, role: UserRole) -> Result<bool>;

    /// Subscribe to auth-state notifications (sign-in, sign-out, refresh).
    ///
    /// Each call returns an independent receiver on the same stream.
    fn auth_events(&self) -> broadcast::Receiver<AuthEvent>;

    /// Sign the current session out
    async fn sign_out(&self) -> Result<()>;
}

/// Push-style change notifications for named backend resources.
///
/// The backend multiplexes interest internally; dropping the receiver ends
/// this subscriber's registration.
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to all insert/update/delete events on one resource
    fn subscribe(&self, resource: &str) -> broadcast::Receiver<ChangeEvent>;
}
