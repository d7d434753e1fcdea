// ABOUTME: Integration tests for the request gate running in the full router
// ABOUTME: Session refresh, cookie propagation, static bypass, and failure propagation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, missing_docs)]

mod common;

use coachdesk::identity::memory::IdentityOperation;
use coachdesk::models::{Profile, UserMetadata};
use coachdesk::permissions::RoleSet;
use coachdesk::profiles::memory::ProfileOperation;
use common::{body_json, location, set_cookie_value, set_cookies, TestApp};
use http::StatusCode;

#[tokio::test]
async fn test_unauthenticated_coach_page_redirects_to_login() {
    let app = TestApp::new();

    let response = app.get("/clients/12", None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?redirectTo=%2Fclients%2F12")
    );
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_coach_passes_through_to_page() {
    let app = TestApp::new();
    let coach = app.user("coach@example.com", Some(RoleSet::COACH));
    let cookie = app.session_cookie(&coach);

    let response = app.get("/dashboard", Some(&cookie)).await;

    assert_ne!(response.status(), StatusCode::FOUND);
    assert!(location(&response).is_none());
}

#[tokio::test]
async fn test_athlete_on_admin_redirects_to_athlete_home() {
    let app = TestApp::new();
    let athlete = app.user("athlete@example.com", Some(RoleSet::ATHLETE));
    let cookie = app.session_cookie(&athlete);

    let response = app.get("/admin", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/athlete"));
}

#[tokio::test]
async fn test_missing_profile_row_treated_as_athlete() {
    let app = TestApp::new();
    let user = app.user("new@example.com", None);
    let cookie = app.session_cookie(&user);

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(location(&response).as_deref(), Some("/athlete"));
}

#[tokio::test]
async fn test_empty_role_list_treated_as_athlete() {
    let app = TestApp::new();
    let user = app.user("legacy@example.com", None);
    app.profiles.insert_raw(Profile {
        roles: RoleSet::empty(),
        ..Profile::new(user.id, user.email.clone(), RoleSet::ATHLETE)
    });
    let cookie = app.session_cookie(&user);

    let response = app.get("/programs", Some(&cookie)).await;
    assert_eq!(location(&response).as_deref(), Some("/athlete"));
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_on_pass_through() {
    let app = TestApp::new();
    let coach = app.user("coach@example.com", Some(RoleSet::COACH));
    let session = app.identity.issue_session(coach.id).unwrap();
    app.identity.expire_access_token(&session.tokens.access_token);
    let cookie = format!(
        "cd-access-token={}; cd-refresh-token={}",
        session.tokens.access_token, session.tokens.refresh_token
    );

    let response = app.get("/dashboard", Some(&cookie)).await;

    assert_ne!(response.status(), StatusCode::FOUND);
    let new_access = set_cookie_value(&response, "cd-access-token").unwrap();
    let new_refresh = set_cookie_value(&response, "cd-refresh-token").unwrap();
    assert_ne!(new_access, session.tokens.access_token);
    assert_ne!(new_refresh, session.tokens.refresh_token);
}

#[tokio::test]
async fn test_refreshed_cookies_ride_on_redirects() {
    let app = TestApp::new();
    let athlete = app.user("athlete@example.com", Some(RoleSet::ATHLETE));
    let session = app.identity.issue_session(athlete.id).unwrap();
    let cookie = format!("cd-refresh-token={}", session.tokens.refresh_token);

    let response = app.get("/admin", Some(&cookie)).await;

    assert_eq!(location(&response).as_deref(), Some("/athlete"));
    assert!(set_cookie_value(&response, "cd-access-token").is_some());
}

#[tokio::test]
async fn test_dead_session_cookies_are_cleared() {
    let app = TestApp::new();

    let response = app
        .get(
            "/dashboard",
            Some("cd-access-token=stale; cd-refresh-token=also-stale"),
        )
        .await;

    assert_eq!(
        location(&response).as_deref(),
        Some("/login?redirectTo=%2Fdashboard")
    );
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|cookie| cookie.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_static_assets_skip_the_gate() {
    let app = TestApp::new();

    for path in ["/_next/static/chunks/main.js", "/favicon.ico", "/images/hero.webp"] {
        let response = app.get(path, Some("cd-access-token=stale")).await;
        assert_ne!(response.status(), StatusCode::FOUND, "path {path}");
        assert!(set_cookies(&response).is_empty(), "path {path}");
    }
}

#[tokio::test]
async fn test_forced_password_change_redirects_everything_but_exemptions() {
    let app = TestApp::new();
    let user = app.user_with_metadata(
        "invited@example.com",
        Some(RoleSet::ADMIN),
        UserMetadata {
            force_password_change: true,
        },
    );
    let cookie = app.session_cookie(&user);

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(location(&response).as_deref(), Some("/change-password"));

    let response = app.get("/change-password", Some(&cookie)).await;
    assert_ne!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_provider_outage_is_reported_not_redirected() {
    let app = TestApp::new();
    let coach = app.user("coach@example.com", Some(RoleSet::COACH));
    let cookie = app.session_cookie(&coach);
    app.identity.fail_on(IdentityOperation::SessionLookup);

    let response = app.get("/dashboard", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_profile_store_failure_is_reported() {
    let app = TestApp::new();
    let coach = app.user("coach@example.com", Some(RoleSet::COACH));
    let cookie = app.session_cookie(&coach);
    app.profiles.fail_on(ProfileOperation::Read);

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Public pages never consult the profile store
    let response = app.get("/", Some(&cookie)).await;
    assert_ne!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}
