// ============================
// crates/backend-lib/src/auth/service_impl.rs
// ============================
//! Session lifecycle orchestration: register, login, refresh, logout.
use async_trait::async_trait;
use chrono::{Duration, Utc};
use metrics::counter;
use std::sync::Arc;
use stayline_common::{AuthResponse, RegisterRequest};
use tracing::{info, warn};

use crate::accounts::{Account, AccountDirectory, NewAccount, DEFAULT_ROLE_NAME};
use crate::auth::password;
use crate::auth::session_store::SessionStore;
use crate::auth::token::TokenCodec;
use crate::auth::{AuthService, LogoutTarget};
use crate::config::JwtSettings;
use crate::error::AppError;
use crate::metrics as keys;

/// Lifecycle manager over the account directory, session record store
/// and token codec. Owns the session-level invariants; see the trait
/// for the operation contracts.
pub struct SessionLifecycle {
    accounts: Arc<dyn AccountDirectory>,
    store: Arc<dyn SessionStore>,
    codec: Arc<TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionLifecycle {
    pub fn new(
        accounts: Arc<dyn AccountDirectory>,
        store: Arc<dyn SessionStore>,
        codec: Arc<TokenCodec>,
        jwt: &JwtSettings,
    ) -> Self {
        Self {
            accounts,
            store,
            codec,
            access_ttl: Duration::seconds(jwt.access_ttl_secs as i64),
            refresh_ttl: Duration::seconds(jwt.refresh_ttl_secs as i64),
        }
    }

    /// Primary role name for token claims: lowest role id, falling back
    /// to the default role name for accounts with no roles attached.
    fn role_name_for(account: &Account) -> String {
        account
            .primary_role()
            .map(|r| r.name.clone())
            .unwrap_or_else(|| DEFAULT_ROLE_NAME.to_string())
    }

    fn mint_pair(&self, email: &str, role: &str) -> Result<(String, String), AppError> {
        let access = self.codec.issue_access_token(email, role, self.access_ttl)?;
        let refresh = self.codec.issue_refresh_token(email, self.refresh_ttl)?;
        Ok((access, refresh))
    }

    async fn invalidate_all_for(&self, account_id: uuid::Uuid) -> Result<usize, AppError> {
        let records = self.store.find_by_owner(account_id).await?;
        let ids: Vec<uuid::Uuid> = records
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.id)
            .collect();
        if !ids.is_empty() {
            self.store.bulk_invalidate(&ids, Utc::now()).await?;
        }
        Ok(ids.len())
    }
}

#[async_trait]
impl AuthService for SessionLifecycle {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        if self.accounts.exists_by_email(&request.email).await? {
            return Err(AppError::Conflict(request.email));
        }

        // an operational precondition, not a user error
        let role = self
            .accounts
            .resolve_default_role()
            .await?
            .ok_or_else(|| AppError::Misconfigured("default role not found".to_string()))?;

        let password_hash = password::hash_password(&request.password)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

        let account = self
            .accounts
            .create_account(NewAccount {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                phone_number: request.phone_number,
                avatar_url: request.avatar_url,
                password_hash,
                roles: vec![role.clone()],
            })
            .await?;

        let (access_token, refresh_token) = self.mint_pair(&account.email, &role.name)?;
        match self
            .store
            .insert(&refresh_token, account.id, Utc::now())
            .await
        {
            Ok(_) => {},
            Err(err) => {
                // all-or-nothing: the account must not outlive a failed
                // session insert
                self.accounts.remove_account(account.id).await?;
                return Err(err);
            },
        }

        counter!(keys::ACCOUNT_REGISTERED).increment(1);
        counter!(keys::SESSION_CREATED).increment(1);
        info!(account_id = %account.id, "account registered");

        Ok(AuthResponse {
            access_token,
            refresh_token,
            role: role.name,
        })
    }

    async fn login(&self, email: &str, password_plain: &str) -> Result<AuthResponse, AppError> {
        // unknown email and bad password collapse into one error so the
        // response never reveals which half failed
        let account = match self.accounts.find_by_email(email).await? {
            Some(account) => account,
            None => {
                counter!(keys::LOGIN_FAILED).increment(1);
                return Err(AppError::InvalidCredentials);
            },
        };

        if !password::verify_password(&account.password_hash, password_plain) {
            counter!(keys::LOGIN_FAILED).increment(1);
            return Err(AppError::InvalidCredentials);
        }

        let role_name = Self::role_name_for(&account);
        let (access_token, refresh_token) = self.mint_pair(&account.email, &role_name)?;

        // a fresh login supersedes every prior session for this account,
        // even ones still within their validity window
        self.store
            .supersede_for_owner(account.id, &refresh_token, Utc::now())
            .await?;

        counter!(keys::LOGIN_SUCCEEDED).increment(1);
        counter!(keys::SESSION_CREATED).increment(1);
        info!(account_id = %account.id, "login superseded prior sessions");

        Ok(AuthResponse {
            access_token,
            refresh_token,
            role: role_name,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AppError> {
        let record = self
            .store
            .find_by_value(refresh_token)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if record.expired || record.revoked {
            return Err(AppError::SessionInvalid);
        }

        // store flags and the signature check are both required; an
        // active record says nothing about the string's integrity
        if !self.codec.is_structurally_valid(refresh_token) {
            return Err(AppError::InvalidToken);
        }

        // time-based expiry is detected lazily, on use
        if self.codec.is_expired(refresh_token)? {
            self.store
                .bulk_invalidate(&[record.id], Utc::now())
                .await?;
            counter!(keys::SESSION_REVOKED).increment(1);
            return Err(AppError::SessionInvalid);
        }

        let subject = self.codec.subject_of(refresh_token)?;
        let account = self
            .accounts
            .find_by_email(&subject)
            .await?
            .ok_or(AppError::InvalidToken)?;

        // a new access token only; the refresh token is not rotated and
        // stays valid until it expires or is revoked
        let role_name = Self::role_name_for(&account);
        let access_token = self
            .codec
            .issue_access_token(&account.email, &role_name, self.access_ttl)?;

        counter!(keys::TOKEN_REFRESHED).increment(1);

        Ok(AuthResponse {
            access_token,
            refresh_token: refresh_token.to_string(),
            role: role_name,
        })
    }

    async fn logout(&self, target: LogoutTarget) -> Result<(), AppError> {
        // nothing-found is success; logout never errors on a miss
        match target {
            LogoutTarget::ByToken(value) => {
                if let Some(record) = self.store.find_by_value(&value).await? {
                    self.store
                        .bulk_invalidate(&[record.id], Utc::now())
                        .await?;
                    counter!(keys::SESSION_REVOKED).increment(1);
                    info!(record_id = %record.id, "session logged out");
                }
            },
            LogoutTarget::ByAccount(email) => {
                if let Some(account) = self.accounts.find_by_email(&email).await? {
                    let revoked = self.invalidate_all_for(account.id).await?;
                    counter!(keys::SESSION_REVOKED).increment(revoked as u64);
                    info!(account_id = %account.id, revoked, "account logged out everywhere");
                } else {
                    warn!("logout for unknown account ignored");
                }
            },
        }

        Ok(())
    }
}
