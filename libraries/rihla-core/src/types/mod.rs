//! Domain types shared across the workspace

mod auth;
mod change;
mod dashboard;

pub use auth::{AuthEvent, Session, UserRole};
pub use change::{ChangeEvent, ChangeKind};
pub use dashboard::{
    AdminDashboard, ApplicationStageCount, DashboardPayload, DashboardRole, FetchState,
    InfluencerDashboard, Referral, ReferralStatus, SignupSummary, TeamDashboard,
    TeamMemberSummary,
};
