//! Auth and session operations against the hosted backend.

use crate::client::RihlaServerClient;
use crate::error::{Result, ServerClientError};
use crate::types::{RoleRecord, SignInRequest, TokenResponse, UserResponse};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rihla_core::{AuthEvent, AuthGateway, Session, UserRole};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

impl RihlaServerClient {
    /// Sign in with email and password.
    ///
    /// On success the access token is stored for subsequent requests and a
    /// `SignedIn` event is emitted on the auth stream.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let base = self.url().await;
        let url = format!("{base}/auth/v1/token?grant_type=password");
        debug!(url = %url, email = %email, "Attempting sign-in");

        let api_key = self.config.read().await.api_key.clone();
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .header("apikey", &api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();

        if status.is_success() {
            let token: TokenResponse = response.json().await.map_err(|e| {
                ServerClientError::ParseError(format!("Failed to parse sign-in response: {}", e))
            })?;

            let expires_at = Utc::now() + Duration::seconds(token.expires_in as i64);
            let session = Session {
                user_id: token.user.id,
                email: token.user.email,
                access_token: token.access_token.clone(),
                expires_at: Some(expires_at),
            };

            let mut config = self.config.write().await;
            config.access_token = Some(token.access_token);
            config.token_expires_at = Some(expires_at);
            drop(config);

            info!(user_id = %session.user_id, "Sign-in successful");
            let _ = self.auth_tx.send(AuthEvent::SignedIn(session.clone()));

            Ok(session)
        } else if status.as_u16() == 400 || status.as_u16() == 401 {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Sign-in failed: invalid credentials");
            Err(ServerClientError::AuthFailed(
                "Invalid email or password".to_string(),
            ))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ServerClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Get the current session, if the stored token is still accepted.
    pub async fn session(&self) -> Result<Option<Session>> {
        let config = self.config.read().await;
        let Some(access_token) = config.access_token.clone() else {
            return Ok(None);
        };
        let api_key = config.api_key.clone();
        let expires_at = config.token_expires_at;
        let base = config.url.clone();
        drop(config);

        let url = format!("{base}/auth/v1/user");
        let response = self
            .http
            .get(&url)
            .header("apikey", &api_key)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();

        if status.is_success() {
            let user: UserResponse = response.json().await.map_err(|e| {
                ServerClientError::ParseError(format!("Failed to parse user info: {}", e))
            })?;

            Ok(Some(Session {
                user_id: user.id,
                email: user.email,
                access_token,
                expires_at,
            }))
        } else if status.as_u16() == 401 {
            // Token rejected: no session
            Ok(None)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ServerClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Check whether an identity holds the given privilege role.
    pub async fn user_has_role(&self, user_id: &str, role: UserRole) -> Result<bool> {
        let config = self.config.read().await;
        let api_key = config.api_key.clone();
        let access_token = config.access_token.clone();
        let base = config.url.clone();
        drop(config);

        let url = format!("{base}/rest/v1/user_roles?select=role&user_id=eq.{user_id}");
        debug!(user_id = %user_id, role = %role, "Checking privilege role");

        let mut request = self.http.get(&url).header("apikey", &api_key);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(Self::classify)?;
        let status = response.status();

        if status.is_success() {
            let records: Vec<RoleRecord> = response.json().await.map_err(|e| {
                ServerClientError::ParseError(format!("Failed to parse role records: {}", e))
            })?;

            Ok(records.iter().any(|r| r.role == role.as_str()))
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

    /// Sign the current session out.
    ///
    /// The local token is cleared and a `SignedOut` event is emitted even if
    /// the backend call fails; the session is gone either way.
    pub async fn sign_out_session(&self) -> Result<()> {
        let mut config = self.config.write().await;
        let token = config.access_token.take();
        let api_key = config.api_key.clone();
        let base = config.url.clone();
        config.token_expires_at = None;
        drop(config);

        let _ = self.auth_tx.send(AuthEvent::SignedOut);

        let Some(token) = token else {
            debug!("Sign-out with no stored token; nothing to revoke");
            return Ok(());
        };

        let url = format!("{base}/auth/v1/logout");
        let response = self
            .http
            .post(&url)
            .header("apikey", &api_key)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 401 {
            info!("Signed out");
            Ok(())
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
impl AuthGateway for RihlaServerClient {
    async fn current_session(&self) -> rihla_core::Result<Option<Session>> {
        Ok(self.session().await?)
    }

    async fn has_role(&self, user_id: &str, role: UserRole) -> rihla_core::Result<bool> {
        Ok(self.user_has_role(user_id, role).await?)
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_tx.subscribe()
    }

    async fn sign_out(&self) -> rihla_core::Result<()> {
        Ok(self.sign_out_session().await?)
    }
}
