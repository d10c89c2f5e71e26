//! In-memory fakes for the backend capabilities.

use async_trait::async_trait;
use rihla_core::{
    AdminDashboard, AuthEvent, AuthGateway, ChangeEvent, ChangeFeed, ChangeKind, DashboardApi,
    InfluencerDashboard, Result, RihlaError, Session, TeamDashboard, UserRole,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// Let spawned tasks catch up with everything emitted so far.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Change feed
// =============================================================================

/// Broadcast-backed change feed with a test-side emitter.
#[derive(Default)]
pub struct InMemoryFeed {
    channels: Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl InMemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event to the resource's subscribers.
    pub fn emit(&self, resource: &str, kind: ChangeKind) {
        let channels = self.channels.lock().expect("feed lock");
        if let Some(sender) = channels.get(resource) {
            let _ = sender.send(ChangeEvent::new(resource, kind));
        }
    }

    /// Drop the resource's channel, closing subscribed receivers.
    pub fn close(&self, resource: &str) {
        let mut channels = self.channels.lock().expect("feed lock");
        channels.remove(resource);
    }
}

impl ChangeFeed for InMemoryFeed {
    fn subscribe(&self, resource: &str) -> broadcast::Receiver<ChangeEvent> {
        let mut channels = self.channels.lock().expect("feed lock");
        channels
            .entry(resource.to_string())
            .or_insert_with(|| broadcast::channel(64).0)
            .subscribe()
    }
}

// =============================================================================
// Dashboard API
// =============================================================================

/// How the fake should fail, if at all
#[derive(Debug, Clone)]
pub enum FailMode {
    Cancelled,
    Message(String),
}

/// Dashboard API fake that echoes the requested subject id back in the
/// payload, optionally delaying or failing.
#[derive(Default)]
pub struct FakeDashboardApi {
    pub delay: Duration,
    fail_mode: Mutex<Option<FailMode>>,
    influencer_calls: AtomicUsize,
    team_calls: AtomicUsize,
    admin_calls: AtomicUsize,
}

impl FakeDashboardApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn set_fail_mode(&self, mode: Option<FailMode>) {
        *self.fail_mode.lock().expect("fail mode lock") = mode;
    }

    pub fn total_calls(&self) -> usize {
        self.influencer_calls.load(Ordering::SeqCst)
            + self.team_calls.load(Ordering::SeqCst)
            + self.admin_calls.load(Ordering::SeqCst)
    }

    pub fn admin_calls(&self) -> usize {
        self.admin_calls.load(Ordering::SeqCst)
    }

    async fn complete(&self) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.fail_mode.lock().expect("fail mode lock").clone() {
            None => Ok(()),
            Some(FailMode::Cancelled) => Err(RihlaError::Cancelled),
            Some(FailMode::Message(msg)) => Err(RihlaError::Other(msg)),
        }
    }
}

#[async_trait]
impl DashboardApi for FakeDashboardApi {
    async fn fetch_influencer_dashboard(&self, influencer_id: &str) -> Result<InfluencerDashboard> {
        self.influencer_calls.fetch_add(1, Ordering::SeqCst);
        self.complete().await?;
        Ok(influencer_dashboard(influencer_id))
    }

    async fn fetch_team_dashboard(&self, team_id: &str) -> Result<TeamDashboard> {
        self.team_calls.fetch_add(1, Ordering::SeqCst);
        self.complete().await?;
        Ok(team_dashboard(team_id))
    }

    async fn fetch_admin_dashboard(&self) -> Result<AdminDashboard> {
        self.admin_calls.fetch_add(1, Ordering::SeqCst);
        self.complete().await?;
        Ok(admin_dashboard())
    }
}

pub fn influencer_dashboard(influencer_id: &str) -> InfluencerDashboard {
    InfluencerDashboard {
        influencer_id: influencer_id.to_string(),
        display_name: "Layla".to_string(),
        referral_code: "LAYLA10".to_string(),
        total_referrals: 8,
        converted_referrals: 3,
        pending_referrals: 4,
        total_commission: 450.0,
        recent_referrals: vec![],
    }
}

pub fn team_dashboard(team_id: &str) -> TeamDashboard {
    TeamDashboard {
        team_id: team_id.to_string(),
        team_name: "Amman Partners".to_string(),
        members: vec![],
        total_referrals: 12,
        converted_referrals: 5,
        total_commission: 1200.0,
    }
}

pub fn admin_dashboard() -> AdminDashboard {
    AdminDashboard {
        total_students: 1200,
        total_partners: 14,
        total_influencers: 32,
        open_applications: 87,
        applications_by_stage: vec![],
        recent_signups: vec![],
    }
}

// =============================================================================
// Auth gateway
// =============================================================================

pub fn session_for(user_id: &str) -> Session {
    Session {
        user_id: user_id.to_string(),
        email: Some(format!("{user_id}@rihla.example.com")),
        access_token: "token".to_string(),
        expires_at: None,
    }
}

/// Auth gateway fake with a scriptable session, role grants, and an
/// emittable auth-event stream.
pub struct FakeAuthGateway {
    session: Mutex<Option<Session>>,
    admins: Mutex<HashSet<String>>,
    role_error: AtomicBool,
    sign_out_calls: AtomicUsize,
    events_tx: broadcast::Sender<AuthEvent>,
}

impl Default for FakeAuthGateway {
    fn default() -> Self {
        Self {
            session: Mutex::new(None),
            admins: Mutex::new(HashSet::new()),
            role_error: AtomicBool::new(false),
            sign_out_calls: AtomicUsize::new(0),
            events_tx: broadcast::channel(64).0,
        }
    }
}

impl FakeAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(user_id: &str) -> Self {
        let gateway = Self::default();
        *gateway.session.lock().expect("session lock") = Some(session_for(user_id));
        gateway
    }

    pub fn grant_admin(&self, user_id: &str) {
        self.admins
            .lock()
            .expect("admins lock")
            .insert(user_id.to_string());
    }

    pub fn set_role_error(&self, failing: bool) {
        self.role_error.store(failing, Ordering::SeqCst);
    }

    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for FakeAuthGateway {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().expect("session lock").clone())
    }

    async fn has_role(&self, user_id: &str, role: UserRole) -> Result<bool> {
        if self.role_error.load(Ordering::SeqCst) {
            return Err(RihlaError::network("role query failed"));
        }
        Ok(role == UserRole::Admin && self.admins.lock().expect("admins lock").contains(user_id))
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events_tx.subscribe()
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
