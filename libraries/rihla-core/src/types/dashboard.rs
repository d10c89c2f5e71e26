use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which dashboard variant a coordinator fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardRole {
    Influencer,
    Team,
    Admin,
}

impl DashboardRole {
    /// Whether this role's fetch needs a subject id (influencer/team id).
    ///
    /// The admin dashboard is global and ignores any subject.
    pub fn requires_subject(self) -> bool {
        matches!(self, Self::Influencer | Self::Team)
    }
}

/// Lifecycle of a referred student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Pending,
    Contacted,
    Converted,
    Cancelled,
}

/// One student referral as shown on dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub student_name: String,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
    /// Commission earned for this referral, in the program currency
    pub commission: f64,
}

/// Dashboard snapshot for a single influencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerDashboard {
    pub influencer_id: String,
    pub display_name: String,
    pub referral_code: String,
    pub total_referrals: u32,
    pub converted_referrals: u32,
    pub pending_referrals: u32,
    pub total_commission: f64,
    pub recent_referrals: Vec<Referral>,
}

/// Per-member rollup inside a team dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberSummary {
    pub user_id: String,
    pub display_name: String,
    pub referrals: u32,
    pub conversions: u32,
}

/// Dashboard snapshot for a partner/agent team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDashboard {
    pub team_id: String,
    pub team_name: String,
    pub members: Vec<TeamMemberSummary>,
    pub total_referrals: u32,
    pub converted_referrals: u32,
    pub total_commission: f64,
}

/// Application count for one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStageCount {
    pub stage: String,
    pub count: u32,
}

/// Recently registered account shown on the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupSummary {
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Program-wide dashboard snapshot for administrators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_students: u64,
    pub total_partners: u32,
    pub total_influencers: u32,
    pub open_applications: u32,
    pub applications_by_stage: Vec<ApplicationStageCount>,
    pub recent_signups: Vec<SignupSummary>,
}

/// Tagged union over the three role-specific dashboard snapshots.
///
/// Payloads are read-only; a refetch replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardPayload {
    Influencer(InfluencerDashboard),
    Team(TeamDashboard),
    Admin(AdminDashboard),
}

impl DashboardPayload {
    /// Role this payload belongs to
    pub fn role(&self) -> DashboardRole {
        match self {
            Self::Influencer(_) => DashboardRole::Influencer,
            Self::Team(_) => DashboardRole::Team,
            Self::Admin(_) => DashboardRole::Admin,
        }
    }
}

/// Observable fetch state exposed by a dashboard coordinator.
///
/// `is_loading` is true only while a fetch is in flight. A successful fetch
/// clears `error`; a failed fetch leaves prior `data` in place so callers
/// can keep rendering the stale snapshot next to a retry affordance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    pub data: Option<DashboardPayload>,
    pub error: Option<String>,
    pub is_loading: bool,
}
