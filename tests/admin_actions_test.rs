// ABOUTME: Tests for admin role mutations and account lifecycle actions
// ABOUTME: Authorization table, verified writes, compensation on partial failure, and HTTP envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, missing_docs)]

mod common;

use coachdesk::admin::InviteRequest;
use coachdesk::errors::ErrorCode;
use coachdesk::identity::memory::IdentityOperation;
use coachdesk::identity::IdentityProvider;
use coachdesk::models::AuthUser;
use coachdesk::permissions::{Role, RoleSet};
use coachdesk::profiles::memory::ProfileOperation;
use coachdesk::profiles::ProfileStore;
use common::{body_json, TestApp};
use http::StatusCode;
use serde_json::json;

struct Cast {
    app: TestApp,
    super_admin: AuthUser,
    admin: AuthUser,
    coach: AuthUser,
    athlete: AuthUser,
}

fn cast() -> Cast {
    let app = TestApp::new();
    let super_admin = app.user(
        "root@example.com",
        Some(RoleSet::SUPER_ADMIN | RoleSet::ADMIN),
    );
    let admin = app.user("admin@example.com", Some(RoleSet::ADMIN));
    let coach = app.user("coach@example.com", Some(RoleSet::COACH));
    let athlete = app.user("athlete@example.com", Some(RoleSet::ATHLETE));
    Cast {
        app,
        super_admin,
        admin,
        coach,
        athlete,
    }
}

async fn stored_roles(app: &TestApp, user: &AuthUser) -> RoleSet {
    app.profiles.get_profile(user.id).await.unwrap().unwrap().roles
}

#[tokio::test]
async fn test_admin_can_grant_coach() {
    let cast = cast();
    let admin_service = &cast.app.resources.admin;

    let roles = admin_service
        .promote(&cast.admin, cast.athlete.id, Role::Coach)
        .await
        .unwrap();

    assert_eq!(roles, RoleSet::ATHLETE | RoleSet::COACH);
    assert_eq!(stored_roles(&cast.app, &cast.athlete).await, roles);
}

#[tokio::test]
async fn test_coach_cannot_grant_roles() {
    let cast = cast();
    let err = cast
        .app
        .resources
        .admin
        .promote(&cast.coach, cast.athlete.id, Role::Coach)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert_eq!(stored_roles(&cast.app, &cast.athlete).await, RoleSet::ATHLETE);
}

#[tokio::test]
async fn test_only_super_admin_grants_admin() {
    let cast = cast();
    let admin_service = &cast.app.resources.admin;

    let err = admin_service
        .promote(&cast.admin, cast.coach.id, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let roles = admin_service
        .promote(&cast.super_admin, cast.coach.id, Role::Admin)
        .await
        .unwrap();
    assert_eq!(roles, RoleSet::COACH | RoleSet::ADMIN);
}

#[tokio::test]
async fn test_super_admin_role_is_never_managed() {
    let cast = cast();
    let err = cast
        .app
        .resources
        .admin
        .promote(&cast.super_admin, cast.admin.id, Role::SuperAdmin)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_demoting_last_role_stores_default() {
    let cast = cast();
    let roles = cast
        .app
        .resources
        .admin
        .demote(&cast.admin, cast.coach.id, Role::Coach)
        .await
        .unwrap();

    assert_eq!(roles, RoleSet::DEFAULT);
    assert_eq!(stored_roles(&cast.app, &cast.coach).await, RoleSet::ATHLETE);
}

#[tokio::test]
async fn test_cannot_revoke_own_admin_role() {
    let cast = cast();
    let err = cast
        .app
        .resources
        .admin
        .demote(&cast.super_admin, cast.super_admin.id, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_promote_unknown_profile_is_not_found() {
    let cast = cast();
    let err = cast
        .app
        .resources
        .admin
        .promote(&cast.admin, uuid::Uuid::new_v4(), Role::Coach)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_delete_requires_super_admin() {
    let cast = cast();
    let err = cast
        .app
        .resources
        .admin
        .delete_user(&cast.admin, cast.athlete.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = cast
        .app
        .resources
        .admin
        .delete_user(&cast.super_admin, cast.super_admin.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_delete_removes_profile_and_identity() {
    let cast = cast();
    cast.app
        .resources
        .admin
        .delete_user(&cast.super_admin, cast.athlete.id)
        .await
        .unwrap();

    assert!(cast.app.profiles.get_profile(cast.athlete.id).await.unwrap().is_none());
    assert!(cast
        .app
        .identity
        .get_user_by_id(cast.athlete.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_delete_restores_profile_when_identity_delete_fails() {
    let cast = cast();
    cast.app.identity.fail_on(IdentityOperation::Delete);

    let err = cast
        .app
        .resources
        .admin
        .delete_user(&cast.super_admin, cast.coach.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    assert_eq!(stored_roles(&cast.app, &cast.coach).await, RoleSet::COACH);
    assert!(cast
        .app
        .identity
        .get_user_by_id(cast.coach.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_invite_creates_identity_with_forced_password_change() {
    let cast = cast();
    let profile = cast
        .app
        .resources
        .admin
        .invite_user(
            &cast.admin,
            InviteRequest {
                email: " New.Coach@Example.com ".to_owned(),
                full_name: Some("New Coach".to_owned()),
                roles: RoleSet::COACH,
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.email, "new.coach@example.com");
    assert_eq!(profile.roles, RoleSet::COACH);
    assert_eq!(profile.full_name.as_deref(), Some("New Coach"));

    let identity = cast
        .app
        .identity
        .get_user_by_id(profile.id)
        .await
        .unwrap()
        .unwrap();
    assert!(identity.must_change_password());
    assert_eq!(cast.app.identity.invites_sent("new.coach@example.com"), 1);
}

#[tokio::test]
async fn test_inviting_an_admin_requires_super_admin() {
    let cast = cast();
    let request = || InviteRequest {
        email: "second-admin@example.com".to_owned(),
        full_name: None,
        roles: RoleSet::ADMIN,
    };

    let err = cast
        .app
        .resources
        .admin
        .invite_user(&cast.admin, request())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    cast.app
        .resources
        .admin
        .invite_user(&cast.super_admin, request())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invite_removes_identity_when_profile_insert_fails() {
    let cast = cast();
    cast.app.profiles.fail_on(ProfileOperation::Create);

    let err = cast
        .app
        .resources
        .admin
        .invite_user(
            &cast.admin,
            InviteRequest {
                email: "orphan@example.com".to_owned(),
                full_name: None,
                roles: RoleSet::ATHLETE,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);

    // The email is free again because the identity was rolled back
    cast.app.profiles.clear_failure(ProfileOperation::Create);
    cast.app
        .resources
        .admin
        .invite_user(
            &cast.admin,
            InviteRequest {
                email: "orphan@example.com".to_owned(),
                full_name: None,
                roles: RoleSet::ATHLETE,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_resend_invite() {
    let cast = cast();
    cast.app
        .resources
        .admin
        .resend_invite(&cast.admin, cast.coach.id)
        .await
        .unwrap();
    assert_eq!(cast.app.identity.invites_sent("coach@example.com"), 1);

    let err = cast
        .app
        .resources
        .admin
        .resend_invite(&cast.athlete, cast.coach.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_reset_password_issues_temporary_password() {
    let cast = cast();
    let temporary = cast
        .app
        .resources
        .admin
        .reset_password(&cast.admin, cast.athlete.id)
        .await
        .unwrap();

    assert_eq!(temporary.user_id, cast.athlete.id);
    assert_eq!(temporary.password.len(), 16);
    assert!(cast
        .app
        .identity
        .check_password(cast.athlete.id, &temporary.password));

    let identity = cast
        .app
        .identity
        .get_user_by_id(cast.athlete.id)
        .await
        .unwrap()
        .unwrap();
    assert!(identity.must_change_password());
}

#[tokio::test]
async fn test_reset_password_keeps_old_password_when_flag_cannot_be_set() {
    let cast = cast();
    cast.app.identity.fail_on(IdentityOperation::UpdateMetadata);

    let err = cast
        .app
        .resources
        .admin
        .reset_password(&cast.admin, cast.athlete.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    assert!(cast
        .app
        .identity
        .check_password(cast.athlete.id, common::TEST_PASSWORD));
}

#[tokio::test]
async fn test_reset_password_restores_metadata_when_password_write_fails() {
    let cast = cast();
    cast.app.identity.fail_on(IdentityOperation::SetPassword);

    let err = cast
        .app
        .resources
        .admin
        .reset_password(&cast.admin, cast.athlete.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);

    let identity = cast
        .app
        .identity
        .get_user_by_id(cast.athlete.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!identity.must_change_password());
    assert!(cast
        .app
        .identity
        .check_password(cast.athlete.id, common::TEST_PASSWORD));
}

#[tokio::test]
async fn test_delete_profile_without_identity() {
    let cast = cast();
    let orphan = uuid::Uuid::new_v4();
    cast.app.profiles.insert_raw(coachdesk::models::Profile::new(
        orphan,
        "orphan@example.com",
        RoleSet::ATHLETE,
    ));

    cast.app
        .resources
        .admin
        .delete_user(&cast.super_admin, orphan)
        .await
        .unwrap();

    assert!(cast.app.profiles.get_profile(orphan).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_unknown_user_is_not_found() {
    let cast = cast();
    let err = cast
        .app
        .resources
        .admin
        .delete_user(&cast.super_admin, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_http_promote_and_envelope() {
    let cast = cast();
    let cookie = cast.app.session_cookie(&cast.admin);

    let response = cast
        .app
        .post_json(
            &format!("/api/admin/users/{}/roles", cast.athlete.id),
            Some(&cookie),
            &json!({ "role": "coach" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["roles"], json!(["athlete", "coach"]));
}

#[tokio::test]
async fn test_http_denied_action_uses_error_status() {
    let cast = cast();
    let cookie = cast.app.session_cookie(&cast.coach);

    let response = cast
        .app
        .delete(
            &format!("/api/admin/users/{}", cast.athlete.id),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("delete user"));
}

#[tokio::test]
async fn test_http_unknown_role_is_invalid_input() {
    let cast = cast();
    let cookie = cast.app.session_cookie(&cast.admin);

    let response = cast
        .app
        .delete(
            &format!("/api/admin/users/{}/roles/owner", cast.coach.id),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_http_admin_api_requires_session() {
    let cast = cast();
    let response = cast.app.get("/api/admin/users", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_http_list_users() {
    let cast = cast();
    let cookie = cast.app.session_cookie(&cast.super_admin);

    let response = cast.app.get("/api/admin/users", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 4);
}
