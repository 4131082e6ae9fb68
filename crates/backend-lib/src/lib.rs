// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the Stayline booking backend.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use crate::accounts::{AccountDirectory, InMemoryAccountDirectory};
use crate::auth::{AuthService, InMemorySessionStore, SessionLifecycle, SessionStore, TokenCodec};
use crate::config::Settings;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle service
    pub auth: Arc<dyn AuthService>,
    /// Account directory collaborator
    pub accounts: Arc<dyn AccountDirectory>,
    /// Session record store
    pub store: Arc<dyn SessionStore>,
    /// Token codec, holding the process-wide signing key
    pub codec: Arc<TokenCodec>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create application state over the in-memory reference backends
    pub fn new(settings: Settings) -> Self {
        let accounts: Arc<dyn AccountDirectory> = Arc::new(InMemoryAccountDirectory::new());
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self::with_services(accounts, store, settings)
    }

    /// Create application state over explicit collaborator implementations
    pub fn with_services(
        accounts: Arc<dyn AccountDirectory>,
        store: Arc<dyn SessionStore>,
        settings: Settings,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(settings.jwt.secret.as_bytes()));
        let auth = Arc::new(SessionLifecycle::new(
            accounts.clone(),
            store.clone(),
            codec.clone(),
            &settings.jwt,
        ));

        Self {
            auth,
            accounts,
            store,
            codec,
            settings: Arc::new(settings),
        }
    }
}
