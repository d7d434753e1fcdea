// ABOUTME: Application constants organized by domain
// ABOUTME: Route paths and prefix tables, cookie names, environment variable names, defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Page paths used as redirect targets
pub mod paths {
    /// Login page
    pub const LOGIN: &str = "/login";
    /// Forced password change page
    pub const CHANGE_PASSWORD: &str = "/change-password";
    /// Role picker shown after OAuth sign-in for multi-role users
    pub const SELECT_ROLE: &str = "/select-role";
    /// Coach dashboard, the default dashboard path
    pub const DASHBOARD: &str = "/dashboard";
    /// Athlete home
    pub const ATHLETE_HOME: &str = "/athlete";
    /// Admin home
    pub const ADMIN_HOME: &str = "/admin";
    /// Logout endpoint
    pub const LOGOUT: &str = "/auth/logout";
    /// Endpoint that updates the caller's own password
    pub const ACCOUNT_PASSWORD_API: &str = "/api/account/password";

    /// Query parameter carrying the originally requested path
    pub const REDIRECT_TO_PARAM: &str = "redirectTo";
}

/// Static prefix tables used to classify request paths
pub mod route_prefixes {
    /// Coach area
    pub const COACH: &[&str] = &[
        "/dashboard",
        "/clients",
        "/programs",
        "/workouts",
        "/messages",
        "/calendar",
        "/analytics",
        "/settings",
    ];

    /// Athlete area
    pub const ATHLETE: &[&str] = &["/athlete"];

    /// Admin area
    pub const ADMIN: &[&str] = &["/admin"];

    /// Pages only meaningful without a session
    pub const AUTH_ONLY: &[&str] = &["/login", "/register", "/reset-password", "/forgot-password"];
}

/// Paths the gate never runs for
pub mod static_assets {
    /// Asset path prefixes
    pub const PREFIXES: &[&str] = &["/_next/static/", "/_next/image", "/static/", "/favicon.ico"];

    /// Image file extensions (lowercase, without dot)
    pub const EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];
}

/// Session cookie names and lifetimes
pub mod cookies {
    /// Access token cookie
    pub const ACCESS_TOKEN: &str = "cd-access-token";
    /// Refresh token cookie
    pub const REFRESH_TOKEN: &str = "cd-refresh-token";
    /// PKCE verifier stored by the sign-in page before the OAuth redirect
    pub const CODE_VERIFIER: &str = "cd-code-verifier";
    /// Refresh cookie lifetime in seconds (30 days)
    pub const REFRESH_TOKEN_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;
}

/// Environment variable names
pub mod env_config {
    /// Auth provider base URL
    pub const AUTH_PROVIDER_URL: &str = "AUTH_PROVIDER_URL";
    /// Auth provider public (anon) key
    pub const AUTH_PROVIDER_ANON_KEY: &str = "AUTH_PROVIDER_ANON_KEY";
    /// Auth provider service key for admin operations
    pub const AUTH_PROVIDER_SERVICE_KEY: &str = "AUTH_PROVIDER_SERVICE_KEY";
    /// Backend selection
    pub const BACKEND: &str = "COACHDESK_BACKEND";
    /// Database URL for the sqlite backend
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// HTTP port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Directory holding prebuilt pages
    pub const STATIC_DIR: &str = "STATIC_DIR";
    /// Comma-separated CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Secure flag on session cookies
    pub const COOKIE_SECURE: &str = "COOKIE_SECURE";
    /// Typing indicator idle timeout
    pub const TYPING_IDLE_MS: &str = "TYPING_IDLE_MS";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Password for the demo accounts seeded into the memory backend
    pub const DEV_SEED_PASSWORD: &str = "COACHDESK_DEV_SEED_PASSWORD";
}

/// Default configuration values
pub mod defaults {
    /// HTTP port
    pub const HTTP_PORT: u16 = 3000;
    /// SQLite database URL
    pub const DATABASE_URL: &str = "sqlite:./data/coachdesk.db";
    /// Static page directory
    pub const STATIC_DIR: &str = "./public";
    /// Typing indicator idle timeout in milliseconds
    pub const TYPING_IDLE_MS: u64 = 3000;
    /// Broadcast buffer per conversation
    pub const TYPING_CHANNEL_CAPACITY: usize = 16;
    /// Minimum accepted password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Length of admin-issued temporary passwords
    pub const TEMP_PASSWORD_LENGTH: usize = 16;
}

/// Service names for logging and health output
pub mod service_names {
    /// Gateway service name
    pub const COACHDESK: &str = "coachdesk";
}
