// ABOUTME: Shared server resources built once at startup and handed to every route
// ABOUTME: Wires the identity provider, profile store, gate, admin service, and typing hub per backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{info, warn};

use crate::admin::RoleAdminService;
use crate::config::environment::{AuthProviderConfig, BackendKind, ServerConfig};
use crate::constants::{defaults, env_config};
use crate::errors::{AppError, AppResult};
use crate::models::{Profile, UserMetadata};
use crate::gate::RequestGate;
use crate::hosted_api::HostedApi;
use crate::identity::{HostedAuthClient, IdentityProvider, MemoryIdentityProvider};
use crate::profiles::{HostedProfileStore, MemoryProfileStore, ProfileStore, SqliteProfileStore};
use crate::security::cookies::CookieWriter;
use crate::session::SessionManager;
use crate::permissions::RoleSet;
use crate::sse::{TypingDebouncer, TypingHub};

/// Explicitly constructed clients shared by all handlers
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Auth provider
    pub identity: Arc<dyn IdentityProvider>,
    /// Profile and role storage
    pub profiles: Arc<dyn ProfileStore>,
    /// Cookie session handling
    pub sessions: SessionManager,
    /// Request gate
    pub gate: Arc<RequestGate>,
    /// Admin actions
    pub admin: RoleAdminService,
    /// Typing indicator channels
    pub typing_hub: Arc<TypingHub>,
    /// Typing indicator debounce
    pub typing: TypingDebouncer,
}

impl ServerResources {
    /// Assemble resources around already constructed clients
    #[must_use]
    pub fn new(
        config: ServerConfig,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let sessions = SessionManager::new(
            Arc::clone(&identity),
            CookieWriter::new(config.cookies.secure),
        );
        let gate = Arc::new(RequestGate::new(sessions.clone(), Arc::clone(&profiles)));
        let admin = RoleAdminService::new(Arc::clone(&identity), Arc::clone(&profiles));
        let typing_hub = Arc::new(TypingHub::new(defaults::TYPING_CHANNEL_CAPACITY));
        let typing = TypingDebouncer::new(Arc::clone(&typing_hub), config.typing.idle_timeout);

        Self {
            config: Arc::new(config),
            identity,
            profiles,
            sessions,
            gate,
            admin,
            typing_hub,
            typing,
        }
    }

    /// Build the clients selected by `config.backend`
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_MISSING` when a backend needs the auth provider and
    /// none is configured, or the error from opening the database.
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let (identity, profiles): (Arc<dyn IdentityProvider>, Arc<dyn ProfileStore>) =
            match config.backend {
                BackendKind::Memory => {
                    let identity = MemoryIdentityProvider::new();
                    let profiles = MemoryProfileStore::new();
                    if let Some(password) = &config.dev_seed_password {
                        seed_demo_accounts(&identity, &profiles, password)?;
                    }
                    (Arc::new(identity), Arc::new(profiles))
                }
                BackendKind::Hosted => {
                    let api = HostedApi::new(require_provider(&config)?)?;
                    (
                        Arc::new(HostedAuthClient::new(api.clone())),
                        Arc::new(HostedProfileStore::new(api)),
                    )
                }
                BackendKind::Sqlite => {
                    let api = HostedApi::new(require_provider(&config)?)?;
                    (
                        Arc::new(HostedAuthClient::new(api)),
                        Arc::new(SqliteProfileStore::connect(&config.database_url).await?),
                    )
                }
            };

        info!(
            backend = %config.backend,
            identity = identity.name(),
            profiles = profiles.name(),
            "Server resources initialized"
        );
        Ok(Self::new(config, identity, profiles))
    }
}

fn require_provider(config: &ServerConfig) -> AppResult<&AuthProviderConfig> {
    config
        .auth_provider
        .as_ref()
        .ok_or_else(|| AppError::config_missing(env_config::AUTH_PROVIDER_URL))
}

/// Accounts created for local runs of the memory backend
pub const DEMO_ACCOUNTS: &[(&str, RoleSet)] = &[
    (
        "admin@coachdesk.local",
        RoleSet::ADMIN.union(RoleSet::SUPER_ADMIN),
    ),
    ("coach@coachdesk.local", RoleSet::COACH),
    ("athlete@coachdesk.local", RoleSet::ATHLETE),
];

fn seed_demo_accounts(
    identity: &MemoryIdentityProvider,
    profiles: &MemoryProfileStore,
    password: &str,
) -> AppResult<()> {
    for (email, roles) in DEMO_ACCOUNTS {
        let user = identity.create_user(email, password, UserMetadata::default())?;
        profiles.insert_raw(Profile::new(user.id, *email, *roles));
        warn!(email = %email, roles = ?roles, "Seeded demo account");
    }
    Ok(())
}
