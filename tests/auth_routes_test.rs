// ABOUTME: Integration tests for sign-in, OAuth callback, sign-out, and account routes
// ABOUTME: Drives the full router against the memory backend and inspects redirects and cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, missing_docs)]

mod common;

use coachdesk::config::ServerConfig;
use coachdesk::identity::memory::IdentityOperation;
use coachdesk::models::UserMetadata;
use coachdesk::permissions::RoleSet;
use coachdesk::resources::{ServerResources, DEMO_ACCOUNTS};
use common::{body_json, location, set_cookie_value, set_cookies, TestApp, TEST_PASSWORD};
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_login_sets_cookies_and_follows_redirect_target() {
    let app = TestApp::new();
    app.user("coach@example.com", Some(RoleSet::COACH));

    let response = app
        .post_form(
            "/auth/login",
            None,
            &format!("email=coach%40example.com&password={TEST_PASSWORD}&redirectTo=%2Fclients%2F7"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/clients/7"));
    assert!(set_cookie_value(&response, "cd-access-token").is_some());
    assert!(set_cookie_value(&response, "cd-refresh-token").is_some());
}

#[tokio::test]
async fn test_login_ignores_external_redirect_target() {
    let app = TestApp::new();
    app.user("coach@example.com", Some(RoleSet::COACH));

    let response = app
        .post_form(
            "/auth/login",
            None,
            &format!("email=coach%40example.com&password={TEST_PASSWORD}&redirectTo=%2F%2Fevil.example"),
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/dashboard"));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new();
    app.user("coach@example.com", Some(RoleSet::COACH));

    let response = app
        .post_form(
            "/auth/login",
            None,
            "email=coach%40example.com&password=wrong",
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?error=invalid_credentials")
    );
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_callback_with_single_role_goes_to_default_area() {
    let app = TestApp::new();
    let admin = app.user("admin@example.com", Some(RoleSet::ADMIN));
    let code = app.identity.issue_auth_code(admin.id);

    let response = app
        .get(&format!("/auth/callback?code={code}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/admin"));
    assert!(set_cookie_value(&response, "cd-access-token").is_some());
}

#[tokio::test]
async fn test_callback_honours_local_next() {
    let app = TestApp::new();
    let athlete = app.user("athlete@example.com", Some(RoleSet::ATHLETE));
    let code = app.identity.issue_auth_code(athlete.id);

    let response = app
        .get(
            &format!("/auth/callback?code={code}&next=%2Fathlete%2Fworkouts"),
            None,
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/athlete/workouts"));
}

#[tokio::test]
async fn test_callback_with_several_roles_asks_for_selection() {
    let app = TestApp::new();
    let user = app.user("both@example.com", Some(RoleSet::COACH | RoleSet::ATHLETE));
    let code = app.identity.issue_auth_code(user.id);

    let response = app
        .get(&format!("/auth/callback?code={code}&next=%2Fdashboard"), None)
        .await;
    assert_eq!(location(&response).as_deref(), Some("/select-role"));
}

#[tokio::test]
async fn test_callback_code_is_single_use() {
    let app = TestApp::new();
    let user = app.user("coach@example.com", Some(RoleSet::COACH));
    let code = app.identity.issue_auth_code(user.id);
    let path = format!("/auth/callback?code={code}");

    app.get(&path, None).await;
    let response = app.get(&path, None).await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?error=auth_callback_failed")
    );

    let response = app.get("/auth/callback", None).await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?error=auth_callback_failed")
    );
}

#[tokio::test]
async fn test_logout_clears_cookies_and_revokes_session() {
    let app = TestApp::new();
    let coach = app.user("coach@example.com", Some(RoleSet::COACH));
    let cookie = app.session_cookie(&coach);

    let response = app.get("/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/login"));
    let cleared = set_cookies(&response);
    assert_eq!(cleared.len(), 2);
    assert!(cleared.iter().all(|value| value.contains("Max-Age=0")));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?redirectTo=%2Fdashboard")
    );
}

#[tokio::test]
async fn test_logout_while_provider_is_down() {
    let app = TestApp::new();
    let coach = app.user("coach@example.com", Some(RoleSet::COACH));
    let cookie = app.session_cookie(&coach);
    app.identity.fail_on(IdentityOperation::SessionLookup);

    // The gate cannot resolve the session, so the error surfaces before logout
    let response = app.get("/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    app.identity.clear_failure(IdentityOperation::SessionLookup);
    let response = app.get("/auth/logout", Some(&cookie)).await;
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_password_change_lifts_forced_change() {
    let app = TestApp::new();
    let user = app.user_with_metadata(
        "invited@example.com",
        Some(RoleSet::COACH),
        UserMetadata {
            force_password_change: true,
        },
    );
    let cookie = app.session_cookie(&user);

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(location(&response).as_deref(), Some("/change-password"));

    let response = app
        .post_json(
            "/api/account/password",
            Some(&cookie),
            &json!({ "password": "short" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/account/password",
            Some(&cookie),
            &json!({ "password": "a-much-better-password" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
    assert!(app.identity.check_password(user.id, "a-much-better-password"));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_ne!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_me_reports_roles() {
    let app = TestApp::new();
    let coach = app.user("coach@example.com", Some(RoleSet::COACH | RoleSet::ADMIN));
    let cookie = app.session_cookie(&coach);

    let response = app.get("/api/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "coach@example.com");
    assert_eq!(body["roles"], json!(["coach", "admin"]));
    assert_eq!(body["force_password_change"], false);

    let response = app.get("/api/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_seeded_memory_backend_accepts_demo_sign_in() {
    let config = ServerConfig::from_lookup(|key| match key {
        "COACHDESK_BACKEND" => Some("memory".to_owned()),
        "COACHDESK_DEV_SEED_PASSWORD" => Some("local-demo-pass".to_owned()),
        _ => None,
    })
    .unwrap();
    let resources = ServerResources::from_config(config).await.unwrap();

    for (email, roles) in DEMO_ACCOUNTS {
        let issued = resources
            .identity
            .sign_in_with_password(email, "local-demo-pass")
            .await
            .unwrap();
        assert_eq!(issued.user.email, *email);
        assert!(!issued.user.must_change_password());

        let stored = resources.profiles.fetch_roles(issued.user.id).await.unwrap();
        assert_eq!(stored, Some(*roles));
    }

    let err = resources
        .identity
        .sign_in_with_password("coach@coachdesk.local", TEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 401);
}

#[tokio::test]
async fn test_unseeded_memory_backend_has_no_accounts() {
    let config = ServerConfig::from_lookup(|key| {
        (key == "COACHDESK_BACKEND").then(|| "memory".to_owned())
    })
    .unwrap();
    let resources = ServerResources::from_config(config).await.unwrap();
    assert!(resources
        .identity
        .sign_in_with_password("coach@coachdesk.local", "local-demo-pass")
        .await
        .is_err());
}
