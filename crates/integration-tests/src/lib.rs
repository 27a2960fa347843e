//! Integration test harness for Stockroom.
//!
//! [`TestApp::spawn`] serves the real router, with in-memory stores, on an
//! ephemeral local port. Tests drive it over HTTP with `reqwest`, so routing,
//! extractors, middleware and the response envelope are all exercised.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockroom-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::SecretString;
use serde_json::{Value, json};
use stockroom_api::config::{AuthConfig, CacheConfig};
use stockroom_api::state::{AppState, Collaborators};

/// Signing secret for test tokens.
const TEST_JWT_SECRET: &str = "kR8#vQ2!mZ5$wL9@pX3^tN7&bH1*yF4%";

/// Password used by [`TestApp::register`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A running server plus a client pointed at it.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
}

/// A logged-in test user.
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Start a fresh server with empty stores.
    pub async fn spawn() -> Self {
        let auth = AuthConfig {
            jwt_secret: SecretString::from(TEST_JWT_SECRET),
            access_token_ttl: Duration::from_secs(300),
            refresh_token_ttl: Duration::from_secs(86_400),
        };
        let cache = CacheConfig::default();
        let state = AppState::new(&auth, cache.item_ttl, Collaborators::in_memory(cache));
        let app = stockroom_api::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
                .await
                .expect("Test server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    #[must_use]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    #[must_use]
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Register `username` with [`TEST_PASSWORD`].
    pub async fn register(&self, username: &str) -> Response {
        self.post("/auth/register/")
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .expect("register request failed")
    }

    /// Log in, panicking unless it succeeds.
    pub async fn login(&self, identifier: &str) -> Session {
        let response = self
            .post("/auth/login/")
            .json(&json!({ "username": identifier, "password": TEST_PASSWORD }))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(response.status(), 200, "login should succeed");

        let body = envelope(response).await;
        Session {
            access_token: body["data"]["access_token"]
                .as_str()
                .expect("access_token missing")
                .to_owned(),
            refresh_token: body["data"]["refresh_token"]
                .as_str()
                .expect("refresh_token missing")
                .to_owned(),
        }
    }

    /// Register and log in a new user.
    pub async fn signed_in(&self, username: &str) -> Session {
        let response = self.register(username).await;
        assert_eq!(response.status(), 201, "registration should succeed");
        self.login(username).await
    }
}

/// Read the response envelope, checking `status` mirrors the HTTP status.
pub async fn envelope(response: Response) -> Value {
    let status = response.status().as_u16();
    let body: Value = response.json().await.expect("body is not JSON");
    assert_eq!(body["status"], status, "envelope status mismatch: {body}");
    body
}
