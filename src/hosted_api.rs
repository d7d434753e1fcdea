// ABOUTME: Shared HTTP plumbing for the hosted auth provider and its REST profile table
// ABOUTME: Builds authenticated requests and maps non-success responses to AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::environment::AuthProviderConfig;
use crate::errors::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Service name used in error messages
pub const SERVICE: &str = "auth provider";

/// Base client for the hosted backend
#[derive(Clone)]
pub struct HostedApi {
    http: Client,
    base: Url,
    anon_key: String,
    service_key: Option<String>,
}

impl HostedApi {
    /// Build a client for the configured provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: &AuthProviderConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            base,
            anon_key: config.anon_key.clone(),
            service_key: config.service_key.clone(),
        })
    }

    /// Whether admin endpoints can be called
    #[must_use]
    pub const fn has_service_key(&self) -> bool {
        self.service_key.is_some()
    }

    fn url(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::internal(format!("Invalid provider path '{path}': {e}")))
    }

    /// Request authorized with the public key only
    pub fn public(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        Ok(self
            .http
            .request(method, self.url(path)?)
            .header("apikey", &self.anon_key))
    }

    /// Request on behalf of a signed-in user
    pub fn as_user(&self, method: Method, path: &str, access_token: &str) -> AppResult<RequestBuilder> {
        Ok(self.public(method, path)?.bearer_auth(access_token))
    }

    /// Read request using the service key when configured, else the public key
    pub fn as_reader(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        if self.has_service_key() {
            self.as_service(method, path)
        } else {
            self.public(method, path)
        }
    }

    /// Request with the service key, for admin endpoints and profile writes
    pub fn as_service(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let key = self.service_key.as_deref().ok_or_else(|| {
            AppError::config(
                "AUTH_PROVIDER_SERVICE_KEY is required for admin operations on the hosted backend",
            )
        })?;

        Ok(self
            .http
            .request(method, self.url(path)?)
            .header("apikey", key)
            .bearer_auth(key))
    }
}

/// Error payload; the provider spells the message differently per endpoint
#[derive(Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self) -> Option<String> {
        [self.error_description, self.msg, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

fn provider_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ProviderErrorBody>(body)
        .ok()
        .and_then(ProviderErrorBody::into_message)
}

/// Convert a non-success response into an error carrying the provider's message
pub async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let message = provider_message(&body).unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::auth_invalid(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => AppError::already_exists(message),
        StatusCode::BAD_REQUEST => AppError::invalid_input(message),
        s if s.is_server_error() => AppError::external_unavailable(SERVICE, message),
        _ => AppError::external_service(SERVICE, message),
    }
}
