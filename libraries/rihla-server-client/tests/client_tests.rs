//! Tests for the Rihla backend client.
//!
//! These use mock servers to verify client behavior without requiring a
//! real backend project.

use rihla_core::{AuthEvent, AuthGateway, ChangeFeed, ChangeKind, DashboardApi, UserRole};
use rihla_server_client::{RihlaServerClient, ServerConfig, ServerClientError};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authenticated_client(uri: String) -> RihlaServerClient {
    let config = ServerConfig::with_token(uri, "anon-key", "valid_token");
    RihlaServerClient::new(config).unwrap()
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_urls_accepted() {
        assert!(RihlaServerClient::new(ServerConfig::new("https://example.com", "key")).is_ok());
        assert!(RihlaServerClient::new(ServerConfig::new("http://localhost:8080", "key")).is_ok());
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = RihlaServerClient::new(ServerConfig::new("", "key"));
        match result {
            Err(ServerClientError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            Err(e) => panic!("Expected InvalidUrl error, got: {:?}", e),
            Ok(_) => panic!("Expected InvalidUrl error, got a client"),
        }
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let result = RihlaServerClient::new(ServerConfig::new("ftp://example.com", "key"));
        assert!(matches!(result, Err(ServerClientError::InvalidUrl(_))));
    }
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_successful_sign_in() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new_access_token",
                "expires_in": 3600,
                "user": { "id": "user123", "email": "advisor@rihla.example.com" }
            })))
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri(), "anon-key");
        let client = RihlaServerClient::new(config).unwrap();
        let mut events = client.auth_events();

        let session = client
            .sign_in("advisor@rihla.example.com", "password123")
            .await
            .unwrap();

        assert_eq!(session.user_id, "user123");
        assert_eq!(session.access_token, "new_access_token");
        assert!(session.expires_at.is_some());
        assert!(client.is_authenticated().await);

        match events.recv().await.unwrap() {
            AuthEvent::SignedIn(s) => assert_eq!(s.user_id, "user123"),
            e => panic!("Expected SignedIn event, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_sign_in_invalid_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&mock_server)
            .await;

        let config = ServerConfig::new(mock_server.uri(), "anon-key");
        let client = RihlaServerClient::new(config).unwrap();

        let result = client.sign_in("wrong@example.com", "badpass").await;
        match result.unwrap_err() {
            ServerClientError::AuthFailed(msg) => assert!(msg.contains("Invalid")),
            e => panic!("Expected AuthFailed, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_session_without_token_is_absent() {
        let config = ServerConfig::new("https://example.com", "anon-key");
        let client = RihlaServerClient::new(config).unwrap();

        let session = client.current_session().await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_session_with_valid_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("Authorization", "Bearer valid_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user123",
                "email": "advisor@rihla.example.com"
            })))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let session = client.current_session().await.unwrap().expect("session");

        assert_eq!(session.user_id, "user123");
        assert_eq!(session.email.as_deref(), Some("advisor@rihla.example.com"));
    }

    #[tokio::test]
    async fn test_session_with_rejected_token_is_absent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let session = client.current_session().await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_token_and_emits_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let mut events = client.auth_events();
        assert!(client.is_authenticated().await);

        client.sign_out().await.unwrap();

        assert!(!client.is_authenticated().await);
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_out_clears_token_even_when_backend_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let result = client.sign_out().await;

        assert!(result.is_err());
        assert!(!client.is_authenticated().await);
    }
}

// =============================================================================
// Role Query Tests
// =============================================================================

mod roles {
    use super::*;

    #[tokio::test]
    async fn test_has_role_match() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .and(query_param("user_id", "eq.user123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "role": "admin" },
                { "role": "staff" }
            ])))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        assert!(client.has_role("user123", UserRole::Admin).await.unwrap());
        assert!(!client
            .has_role("user123", UserRole::Influencer)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_has_role_empty_records() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        assert!(!client.has_role("user123", UserRole::Admin).await.unwrap());
    }

    #[tokio::test]
    async fn test_has_role_query_failure_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let result = client.has_role("user123", UserRole::Admin).await;
        assert!(result.is_err());
    }
}

// =============================================================================
// Dashboard Function Tests
// =============================================================================

mod dashboards {
    use super::*;

    #[tokio::test]
    async fn test_influencer_dashboard() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/influencer-dashboard"))
            .and(header("Authorization", "Bearer valid_token"))
            .and(body_json(serde_json::json!({ "influencer_id": "inf1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "influencer_id": "inf1",
                "display_name": "Layla",
                "referral_code": "LAYLA10",
                "total_referrals": 8,
                "converted_referrals": 3,
                "pending_referrals": 4,
                "total_commission": 450.0,
                "recent_referrals": [
                    {
                        "id": "ref1",
                        "student_name": "Omar",
                        "status": "converted",
                        "created_at": "2026-08-01T10:00:00Z",
                        "commission": 150.0
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let dashboard = client.fetch_influencer_dashboard("inf1").await.unwrap();

        assert_eq!(dashboard.influencer_id, "inf1");
        assert_eq!(dashboard.total_referrals, 8);
        assert_eq!(dashboard.recent_referrals.len(), 1);
        assert_eq!(dashboard.recent_referrals[0].student_name, "Omar");
    }

    #[tokio::test]
    async fn test_team_dashboard() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/team-dashboard"))
            .and(body_json(serde_json::json!({ "team_id": "team1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "team_id": "team1",
                "team_name": "Amman Partners",
                "members": [
                    { "user_id": "u1", "display_name": "Sami", "referrals": 12, "conversions": 5 }
                ],
                "total_referrals": 12,
                "converted_referrals": 5,
                "total_commission": 1200.0
            })))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let dashboard = client.fetch_team_dashboard("team1").await.unwrap();

        assert_eq!(dashboard.team_name, "Amman Partners");
        assert_eq!(dashboard.members.len(), 1);
        assert_eq!(dashboard.members[0].conversions, 5);
    }

    #[tokio::test]
    async fn test_admin_dashboard() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/admin-dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_students": 1200,
                "total_partners": 14,
                "total_influencers": 32,
                "open_applications": 87,
                "applications_by_stage": [
                    { "stage": "submitted", "count": 40 },
                    { "stage": "offer", "count": 20 }
                ],
                "recent_signups": []
            })))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let dashboard = client.fetch_admin_dashboard().await.unwrap();

        assert_eq!(dashboard.total_students, 1200);
        assert_eq!(dashboard.applications_by_stage.len(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/admin-dashboard"))
            .respond_with(ResponseTemplate::new(401).set_body_string("no token"))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let result = client.admin_dashboard().await;
        assert!(matches!(
            result.unwrap_err(),
            ServerClientError::AuthRequired
        ));
    }

    #[tokio::test]
    async fn test_dashboard_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/admin-dashboard"))
            .respond_with(ResponseTemplate::new(500).set_body_string("function crashed"))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        match client.admin_dashboard().await.unwrap_err() {
            ServerClientError::ServerError { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("crashed"));
            }
            e => panic!("Expected ServerError, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_dashboard_invalid_json_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/admin-dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        assert!(matches!(
            client.admin_dashboard().await.unwrap_err(),
            ServerClientError::ParseError(_)
        ));
    }
}

// =============================================================================
// Change Feed Tests
// =============================================================================

mod change_feed {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_receives_streamed_events() {
        let mock_server = MockServer::start().await;

        let body = concat!(
            ": keep-alive\n",
            "event: change\n",
            "data: {\"resource\":\"referrals\",\"type\":\"INSERT\",\"record\":{\"id\":1}}\n",
            "\n",
            "data: {\"resource\":\"referrals\",\"type\":\"UPDATE\"}\n",
            "\n",
        );

        Mock::given(method("GET"))
            .and(path("/realtime/v1/stream"))
            .and(query_param("resource", "referrals"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let mut events = client.subscribe("referrals");

        let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for event")
            .unwrap();
        assert_eq!(first.kind, ChangeKind::Insert);
        assert!(first.record.is_some());

        let second = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for event")
            .unwrap();
        assert_eq!(second.kind, ChangeKind::Update);
    }

    #[tokio::test]
    async fn test_second_subscriber_shares_the_feed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/realtime/v1/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "data: {\"resource\":\"referrals\",\"type\":\"DELETE\"}\n\n",
                "text/event-stream",
            ))
            .mount(&mock_server)
            .await;

        let client = authenticated_client(mock_server.uri());
        let mut first = client.subscribe("referrals");
        let mut second = client.subscribe("referrals");

        let a = tokio::time::timeout(Duration::from_secs(5), first.recv())
            .await
            .expect("timed out")
            .unwrap();
        let b = tokio::time::timeout(Duration::from_secs(5), second.recv())
            .await
            .expect("timed out")
            .unwrap();

        assert_eq!(a.kind, ChangeKind::Delete);
        assert_eq!(b.kind, ChangeKind::Delete);
    }
}
