// ABOUTME: Cookie parsing and Set-Cookie header construction for session tokens
// ABOUTME: Session cookies are HttpOnly, SameSite=Lax, and optionally Secure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

use crate::constants::cookies;
use crate::models::{IssuedSession, SessionTokens};

/// Read a cookie value from request headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

/// Session tokens found in request cookies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    /// Access token cookie
    pub access_token: Option<String>,
    /// Refresh token cookie
    pub refresh_token: Option<String>,
}

impl SessionCookies {
    /// Extract both session cookies
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            access_token: get_cookie_value(headers, cookies::ACCESS_TOKEN),
            refresh_token: get_cookie_value(headers, cookies::REFRESH_TOKEN),
        }
    }

    /// Whether the client sent any session cookie
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

/// Builds Set-Cookie headers with shared attributes
#[derive(Debug, Clone, Copy)]
pub struct CookieWriter {
    secure: bool,
}

impl CookieWriter {
    /// Create a writer; `secure` adds the `Secure` attribute
    #[must_use]
    pub const fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn build(self, name: &str, value: &str, max_age: u64) -> Option<HeaderValue> {
        let secure = if self.secure { "; Secure" } else { "" };
        HeaderValue::from_str(&format!(
            "{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}"
        ))
        .ok()
    }

    /// Cookies carrying a newly issued session
    #[must_use]
    pub fn session(self, session: &IssuedSession) -> Vec<HeaderValue> {
        let SessionTokens {
            access_token,
            refresh_token,
        } = &session.tokens;

        [
            self.build(cookies::ACCESS_TOKEN, access_token, session.expires_in),
            self.build(
                cookies::REFRESH_TOKEN,
                refresh_token,
                cookies::REFRESH_TOKEN_MAX_AGE_SECS,
            ),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Cookies that remove the session from the browser
    #[must_use]
    pub fn cleared(self) -> Vec<HeaderValue> {
        [
            self.build(cookies::ACCESS_TOKEN, "", 0),
            self.build(cookies::REFRESH_TOKEN, "", 0),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Append Set-Cookie headers to a response header map
pub fn append_set_cookies(headers: &mut HeaderMap, values: &[HeaderValue]) {
    for value in values {
        headers.append(SET_COOKIE, value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthUser;
    use uuid::Uuid;

    #[test]
    fn test_get_cookie_value_from_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; cd-access-token=abc; other=1"),
        );

        assert_eq!(
            get_cookie_value(&headers, "cd-access-token").as_deref(),
            Some("abc")
        );
        assert!(get_cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("cd-access-token="));
        assert!(!SessionCookies::from_headers(&headers).is_present());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let session = IssuedSession {
            tokens: SessionTokens {
                access_token: "at".into(),
                refresh_token: "rt".into(),
            },
            expires_in: 3600,
            user: AuthUser::new(Uuid::new_v4(), "a@example.com"),
        };

        let values = CookieWriter::new(true).session(&session);
        assert_eq!(values.len(), 2);
        let access = values[0].to_str().unwrap();
        assert!(access.starts_with("cd-access-token=at;"));
        assert!(access.contains("Max-Age=3600"));
        assert!(access.contains("HttpOnly"));
        assert!(access.ends_with("; Secure"));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        let values = CookieWriter::new(false).cleared();
        assert!(values
            .iter()
            .all(|value| value.to_str().unwrap().contains("Max-Age=0")));
    }
}
