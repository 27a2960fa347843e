//! Registration, login and the token lifecycle over HTTP.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use stockroom_integration_tests::{TEST_PASSWORD, TestApp, envelope};

#[tokio::test]
async fn test_welcome_and_health() {
    let app = TestApp::spawn().await;

    let response = app.get("/").send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body = envelope(response).await;
    assert_eq!(body["message"], "Welcome to Inventory Management System App");
    assert!(body["data"].is_null());

    let response = app.get("/health").send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body = envelope(response).await;
    assert_eq!(body["message"], "ok");
    assert!(body["data"].is_null());

    let response = app.get("/health/ready").send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body = envelope(response).await;
    assert_eq!(body["message"], "ready");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_register_returns_public_user() {
    let app = TestApp::spawn().await;

    let response = app.register("keeper").await;
    assert_eq!(response.status(), 201);

    let body = envelope(response).await;
    assert_eq!(body["message"], "user registered successfully");
    assert_eq!(body["data"]["username"], "keeper");
    assert_eq!(body["data"]["email"], "keeper@example.com");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_fields() {
    let app = TestApp::spawn().await;
    app.register("keeper").await;

    let body = envelope(app.register("keeper").await).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "User registration failed due to invalid data.");
    assert_eq!(
        body["data"]["username"][0],
        "A user with that username already exists."
    );

    let response = app
        .post("/auth/register/")
        .json(&json!({ "username": "bad name", "email": "nope", "password": "short" }))
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 400);
    assert!(body["data"]["username"].is_array());
    assert!(body["data"]["email"].is_array());
    assert!(body["data"]["password"].is_array());
}

#[tokio::test]
async fn test_login_by_username_or_email() {
    let app = TestApp::spawn().await;
    app.register("keeper").await;

    let by_name = app.login("keeper").await;
    let by_email = app.login("keeper@example.com").await;
    assert_ne!(by_name.refresh_token, by_email.refresh_token);
}

#[tokio::test]
async fn test_login_failure_is_generic() {
    let app = TestApp::spawn().await;
    app.register("keeper").await;

    for (identifier, password) in [
        ("keeper", "wrong-password"),
        ("ghost", TEST_PASSWORD),
        ("keeper@example.com", "wrong-password"),
    ] {
        let response = app
            .post("/auth/login/")
            .json(&json!({ "username": identifier, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
        let body = envelope(response).await;
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_me_requires_bearer_token() {
    let app = TestApp::spawn().await;
    let session = app.signed_in("keeper").await;

    let body = envelope(app.get("/auth/me/").send().await.unwrap()).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "Authentication credentials were not provided.");

    let response = app
        .get("/auth/me/")
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "Given token not valid for any token type");

    // A refresh token is not an access token.
    let response = app
        .get("/auth/me/")
        .bearer_auth(&session.refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .get("/auth/me")
        .bearer_auth(&session.access_token)
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"]["username"], "keeper");
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = TestApp::spawn().await;
    let session = app.signed_in("keeper").await;

    let response = app
        .post("/auth/refresh/")
        .json(&json!({ "refresh_token": session.refresh_token }))
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "Token refreshed successfully.");
    let access_token = body["data"]["access_token"].as_str().unwrap();

    let response = app
        .get("/auth/me/")
        .bearer_auth(access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .post("/auth/refresh/")
        .json(&json!({ "refresh_token": "garbage" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_logout_revokes_the_session() {
    let app = TestApp::spawn().await;
    let session = app.signed_in("keeper").await;

    let response = app
        .post("/auth/logout/")
        .bearer_auth(&session.access_token)
        .json(&json!({ "refresh_token": session.refresh_token }))
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "Successfully logged out.");

    // The access token belonged to the revoked session.
    let response = app
        .get("/auth/me/")
        .bearer_auth(&session.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .post("/auth/refresh/")
        .json(&json!({ "refresh_token": session.refresh_token }))
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "Token is blacklisted");

    // Revoking it twice is a client error, not a crash.
    let other = app.login("keeper").await;
    let response = app
        .post("/auth/logout/")
        .bearer_auth(&other.access_token)
        .json(&json!({ "refresh_token": session.refresh_token }))
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "Logout failed.");
    assert_eq!(body["data"]["error"], "Token is blacklisted");
}

#[tokio::test]
async fn test_logout_rejects_bad_refresh_tokens() {
    let app = TestApp::spawn().await;
    let keeper = app.signed_in("keeper").await;
    let clerk = app.signed_in("clerk").await;

    for refresh_token in [
        json!("garbage"),
        json!(keeper.access_token),
        json!(clerk.refresh_token),
        json!(null),
    ] {
        let response = app
            .post("/auth/logout/")
            .bearer_auth(&keeper.access_token)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "refresh_token = {refresh_token}");
    }

    // The other user's session is untouched.
    let response = app
        .get("/auth/me/")
        .bearer_auth(&clerk.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login/")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let body = envelope(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "Invalid request body.");
    assert!(body["data"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::spawn().await;

    let body = envelope(app.get("/nowhere").send().await.unwrap()).await;
    assert_eq!(body["status"], 404);
}
