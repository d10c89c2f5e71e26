//! Types for backend API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for connecting to the hosted backend.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the backend project (e.g., "https://rihla.example.com")
    pub url: String,
    /// Project API key sent with every request
    pub api_key: String,
    /// Current access token (if authenticated)
    pub access_token: Option<String>,
    /// Expiry of the current access token
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl ServerConfig {
    /// Create a new config with just the URL and project key.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            access_token: None,
            token_expires_at: None,
        }
    }

    /// Create a config with an existing access token.
    pub fn with_token(
        url: impl Into<String>,
        api_key: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            access_token: Some(access_token.into()),
            token_expires_at: None,
        }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for password sign-in.
#[derive(Debug, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Identity record returned by the auth endpoints.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
}

/// Response from successful sign-in.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Token validity in seconds
    pub expires_in: u64,
    pub user: UserResponse,
}

/// One row of the user_roles table.
#[derive(Debug, Deserialize)]
pub struct RoleRecord {
    pub role: String,
}

// =============================================================================
// Dashboard Function Types
// =============================================================================

/// Request body for the influencer-dashboard function.
#[derive(Debug, Serialize)]
pub struct InfluencerDashboardRequest {
    pub influencer_id: String,
}

/// Request body for the team-dashboard function.
#[derive(Debug, Serialize)]
pub struct TeamDashboardRequest {
    pub team_id: String,
}
