//! Main Rihla backend client.

use crate::error::{Result, ServerClientError};
use crate::types::ServerConfig;
use reqwest::Client;
use rihla_core::{AuthEvent, ChangeEvent, Session};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use url::Url;

/// Capacity of the auth-event and change-feed broadcast channels
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Reader task handle plus fan-out sender for one subscribed resource
pub(crate) struct FeedChannel {
    pub(crate) sender: broadcast::Sender<ChangeEvent>,
    pub(crate) reader: Option<JoinHandle<()>>,
}

/// Client for the Rihla hosted backend.
///
/// The client handles session state and provides the dashboard fetchers,
/// auth queries, and change-feed subscriptions consumed by `rihla-live`.
///
/// # Example
///
/// ```ignore
/// use rihla_server_client::{RihlaServerClient, ServerConfig};
///
/// let config = ServerConfig::new("https://rihla.example.com", "anon-key");
/// let client = RihlaServerClient::new(config)?;
///
/// let session = client.sign_in("advisor@rihla.example.com", "password").await?;
/// let dashboard = client.admin_dashboard().await?;
/// ```
pub struct RihlaServerClient {
    pub(crate) http: Client,
    pub(crate) config: Arc<RwLock<ServerConfig>>,
    pub(crate) auth_tx: broadcast::Sender<AuthEvent>,
    pub(crate) feeds: Mutex<HashMap<String, FeedChannel>>,
}

impl RihlaServerClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let parsed = Url::parse(&config.url)
            .map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let normalized_config = ServerConfig {
            url: config.url.trim_end_matches('/').to_string(),
            ..config
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Rihla/{} (Dashboard)", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServerClientError::Request)?;

        let (auth_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
            auth_tx,
            feeds: Mutex::new(HashMap::new()),
        })
    }

    /// Get the backend URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client holds an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Set an access token directly (e.g., restored from the embedding app).
    ///
    /// Emits a `SignedIn` auth event so attached guards re-evaluate.
    pub async fn set_session(&self, session: Session) {
        let mut config = self.config.write().await;
        config.access_token = Some(session.access_token.clone());
        config.token_expires_at = session.expires_at;
        drop(config);

        let _ = self.auth_tx.send(AuthEvent::SignedIn(session));
    }

    /// Subscribe to auth-state notifications from this client.
    pub fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_tx.subscribe()
    }

    /// Classify a transport-level failure the way callers expect.
    pub(crate) fn classify(e: reqwest::Error) -> ServerClientError {
        if e.is_connect() || e.is_timeout() {
            ServerClientError::ServerUnreachable(e.to_string())
        } else {
            ServerClientError::Request(e)
        }
    }
}
