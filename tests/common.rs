// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds memory-backed server resources, seeds users, and drives the router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `coachdesk`

use std::sync::{Arc, Once};
use std::time::Duration;

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use coachdesk::config::ServerConfig;
use coachdesk::identity::{IdentityProvider, MemoryIdentityProvider};
use coachdesk::models::{AuthUser, Profile, UserMetadata};
use coachdesk::permissions::RoleSet;
use coachdesk::profiles::{MemoryProfileStore, ProfileStore};
use coachdesk::resources::ServerResources;
use coachdesk::routes::build_router;
use http::header::{COOKIE, LOCATION, SET_COOKIE};
use http::{Method, Request};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Configuration for the memory backend with a custom typing idle timeout
pub fn memory_config(typing_idle_ms: u64) -> ServerConfig {
    let idle = typing_idle_ms.to_string();
    ServerConfig::from_lookup(|key| match key {
        "COACHDESK_BACKEND" => Some("memory".to_owned()),
        "TYPING_IDLE_MS" => Some(idle.clone()),
        "STATIC_DIR" => Some("./target/coachdesk-test-pages".to_owned()),
        _ => None,
    })
    .unwrap()
}

/// Memory-backed application with direct access to the stores
pub struct TestApp {
    pub resources: Arc<ServerResources>,
    pub identity: Arc<MemoryIdentityProvider>,
    pub profiles: Arc<MemoryProfileStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_typing_idle(Duration::from_millis(3000))
    }

    pub fn with_typing_idle(idle: Duration) -> Self {
        init_test_logging();
        let identity = Arc::new(MemoryIdentityProvider::new());
        let profiles = Arc::new(MemoryProfileStore::new());
        let config = memory_config(u64::try_from(idle.as_millis()).unwrap());

        let identity_handle: Arc<dyn IdentityProvider> = identity.clone();
        let profile_handle: Arc<dyn ProfileStore> = profiles.clone();
        let resources = Arc::new(ServerResources::new(config, identity_handle, profile_handle));
        let router = build_router(&resources);

        Self {
            resources,
            identity,
            profiles,
            router,
        }
    }

    /// Create an identity and, when `roles` is given, a profile row
    pub fn user(&self, email: &str, roles: Option<RoleSet>) -> AuthUser {
        self.user_with_metadata(email, roles, UserMetadata::default())
    }

    pub fn user_with_metadata(
        &self,
        email: &str,
        roles: Option<RoleSet>,
        metadata: UserMetadata,
    ) -> AuthUser {
        let user = self
            .identity
            .create_user(email, TEST_PASSWORD, metadata)
            .unwrap();
        if let Some(roles) = roles {
            self.profiles
                .insert_raw(Profile::new(user.id, user.email.clone(), roles));
        }
        user
    }

    /// Cookie header value carrying a fresh session for `user`
    pub fn session_cookie(&self, user: &AuthUser) -> String {
        let session = self.identity.issue_session(user.id).unwrap();
        format!(
            "cd-access-token={}; cd-refresh-token={}",
            session.tokens.access_token, session.tokens.refresh_token
        )
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        self.send(request(Method::GET, path, cookie, Body::empty()))
            .await
    }

    pub async fn post_json(
        &self,
        path: &str,
        cookie: Option<&str>,
        body: &serde_json::Value,
    ) -> Response {
        let mut req = request(Method::POST, path, cookie, Body::from(body.to_string()));
        req.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        self.send(req).await
    }

    pub async fn post_form(&self, path: &str, cookie: Option<&str>, body: &str) -> Response {
        let mut req = request(Method::POST, path, cookie, Body::from(body.to_owned()));
        req.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.send(req).await
    }

    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> Response {
        self.send(request(Method::DELETE, path, cookie, Body::empty()))
            .await
    }
}

pub fn request(method: Method, path: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .map(|value| value.to_str().unwrap().to_owned())
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_owned())
        .collect()
}

/// Value of cookie `name` from the response's Set-Cookie headers
pub fn set_cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|cookie| {
        cookie
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value.to_owned())
    })
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
