//! Role-scoped dashboard fetchers.
//!
//! Each dashboard is assembled server-side by a serverless function; the
//! client posts the subject id (where one applies) and receives the full
//! typed snapshot.

use crate::client::RihlaServerClient;
use crate::error::{Result, ServerClientError};
use crate::types::{InfluencerDashboardRequest, TeamDashboardRequest};
use async_trait::async_trait;
use rihla_core::{AdminDashboard, DashboardApi, InfluencerDashboard, TeamDashboard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

impl RihlaServerClient {
    /// Fetch the dashboard snapshot for one influencer.
    pub async fn influencer_dashboard(&self, influencer_id: &str) -> Result<InfluencerDashboard> {
        self.call_function(
            "influencer-dashboard",
            &InfluencerDashboardRequest {
                influencer_id: influencer_id.to_string(),
            },
        )
        .await
    }

    /// Fetch the dashboard snapshot for one partner/agent team.
    pub async fn team_dashboard(&self, team_id: &str) -> Result<TeamDashboard> {
        self.call_function(
            "team-dashboard",
            &TeamDashboardRequest {
                team_id: team_id.to_string(),
            },
        )
        .await
    }

    /// Fetch the program-wide admin dashboard.
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard> {
        self.call_function("admin-dashboard", &serde_json::json!({})).await
    }

    /// POST to one serverless function endpoint and decode the response.
    async fn call_function<B, T>(&self, function: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let config = self.config.read().await;
        let api_key = config.api_key.clone();
        let access_token = config.access_token.clone();
        let base = config.url.clone();
        drop(config);

        let url = format!("{base}/functions/v1/{function}");
        debug!(url = %url, function = %function, "Calling dashboard function");

        let mut request = self.http.post(&url).header("apikey", &api_key).json(body);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(Self::classify)?;
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                ServerClientError::ParseError(format!(
                    "Failed to parse {function} response: {}",
                    e
                ))
            })
        } else if status.as_u16() == 401 {
            Err(ServerClientError::AuthRequired)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ServerClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

#[async_trait]
impl DashboardApi for RihlaServerClient {
    async fn fetch_influencer_dashboard(
        &self,
        influencer_id: &str,
    ) -> rihla_core::Result<InfluencerDashboard> {
        Ok(self.influencer_dashboard(influencer_id).await?)
    }

    async fn fetch_team_dashboard(&self, team_id: &str) -> rihla_core::Result<TeamDashboard> {
        Ok(self.team_dashboard(team_id).await?)
    }

    async fn fetch_admin_dashboard(&self) -> rihla_core::Result<AdminDashboard> {
        Ok(self.admin_dashboard().await?)
    }
}
