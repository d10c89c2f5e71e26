//! Rihla Client Core
//!
//! Platform-agnostic types, traits, and error handling for the Rihla
//! dashboard client.
//!
//! The backend (auth, row storage, change feeds, serverless functions) is an
//! external managed service. This crate defines the capability traits the
//! rest of the workspace consumes so that every component takes the backend
//! as an explicit dependency instead of importing a singleton:
//!
//! - **Domain Types**: `DashboardPayload`, `Session`, `ChangeEvent`, etc.
//! - **Capability Traits**: `DashboardApi`, `AuthGateway`, `ChangeFeed`
//! - **Error Handling**: Unified `RihlaError` and `Result` types

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, RihlaError};
pub use traits::{AuthGateway, ChangeFeed, DashboardApi};

pub use types::{
    // Auth
    AuthEvent, Session, UserRole,
    // Change feed
    ChangeEvent, ChangeKind,
    // Dashboards
    AdminDashboard, ApplicationStageCount, DashboardPayload, DashboardRole, FetchState,
    InfluencerDashboard, Referral, ReferralStatus, SignupSummary, TeamDashboard,
    TeamMemberSummary,
};
