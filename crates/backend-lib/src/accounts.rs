// ============================
// crates/backend-lib/src/accounts.rs
// ============================
//! Account directory abstraction with in-memory implementation.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

/// Role granted to every self-registered account
pub const DEFAULT_ROLE_NAME: &str = "CUSTOMER";

/// A named role attached to accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// A registered account. Lifecycle is owned by the directory; the auth
/// core only reads it and manages its session records.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The account's primary role: lowest role id wins, so token claims
    /// stay reproducible across calls.
    pub fn primary_role(&self) -> Option<&Role> {
        self.roles.iter().min_by_key(|r| r.id)
    }
}

/// Fields needed to create an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Trait for account directory backends
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Whether an account with this email exists (case-insensitive)
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Look up an account by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    /// Create an account; fails with `Conflict` if the email is taken
    async fn create_account(&self, new: NewAccount) -> Result<Account, AppError>;

    /// Hard-remove an account. No-op when the id is unknown.
    async fn remove_account(&self, id: Uuid) -> Result<(), AppError>;

    /// Resolve the role granted at registration, if configured
    async fn resolve_default_role(&self) -> Result<Option<Role>, AppError>;
}

/// In-memory implementation of the `AccountDirectory` trait
#[derive(Clone)]
pub struct InMemoryAccountDirectory {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    roles: Arc<Vec<Role>>,
}

impl InMemoryAccountDirectory {
    /// Create a directory seeded with the standard role set
    pub fn new() -> Self {
        Self::with_roles(vec![
            Role {
                id: 1,
                name: DEFAULT_ROLE_NAME.to_string(),
            },
            Role {
                id: 2,
                name: "ADMIN".to_string(),
            },
        ])
    }

    /// Create a directory with an explicit role set. An empty set makes
    /// `resolve_default_role` come back empty, which registration reports
    /// as `Misconfigured`.
    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            roles: Arc::new(roles),
        }
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

impl Default for InMemoryAccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.contains_key(&Self::normalize(email)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&Self::normalize(email)).cloned())
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account, AppError> {
        let key = Self::normalize(&new.email);
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&key) {
            return Err(AppError::Conflict(new.email));
        }

        let account = Account {
            id: Uuid::new_v4(),
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            phone_number: new.phone_number,
            avatar_url: new.avatar_url,
            password_hash: new.password_hash,
            roles: new.roles,
            created_at: Utc::now(),
        };

        accounts.insert(key, account.clone());
        Ok(account)
    }

    async fn remove_account(&self, id: Uuid) -> Result<(), AppError> {
        let mut accounts = self.accounts.write().await;
        accounts.retain(|_, account| account.id != id);
        Ok(())
    }

    async fn resolve_default_role(&self) -> Result<Option<Role>, AppError> {
        Ok(self
            .roles
            .iter()
            .find(|r| r.name == DEFAULT_ROLE_NAME)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: None,
            avatar_url: None,
            password_hash: "hash".to_string(),
            roles: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_case_insensitive() {
        let directory = InMemoryAccountDirectory::new();
        let created = directory
            .create_account(new_account("Ada@Example.COM"))
            .await
            .unwrap();

        assert!(directory.exists_by_email("ada@example.com").await.unwrap());
        let found = directory
            .find_by_email("ADA@EXAMPLE.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        // original casing is preserved on the stored account
        assert_eq!(found.email, "Ada@Example.COM");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let directory = InMemoryAccountDirectory::new();
        directory
            .create_account(new_account("a@x.com"))
            .await
            .unwrap();

        let err = directory
            .create_account(new_account("A@X.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_default_role_resolution() {
        let directory = InMemoryAccountDirectory::new();
        let role = directory.resolve_default_role().await.unwrap().unwrap();
        assert_eq!(role.name, DEFAULT_ROLE_NAME);

        let empty = InMemoryAccountDirectory::with_roles(vec![]);
        assert!(empty.resolve_default_role().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_account() {
        let directory = InMemoryAccountDirectory::new();
        let created = directory
            .create_account(new_account("a@x.com"))
            .await
            .unwrap();

        directory.remove_account(created.id).await.unwrap();
        assert!(!directory.exists_by_email("a@x.com").await.unwrap());

        // removing again is a no-op
        directory.remove_account(created.id).await.unwrap();
    }

    #[test]
    fn test_primary_role_is_lowest_id() {
        let mut account = Account {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: None,
            avatar_url: None,
            password_hash: "hash".to_string(),
            roles: vec![
                Role { id: 7, name: "ADMIN".to_string() },
                Role { id: 1, name: "CUSTOMER".to_string() },
            ],
            created_at: Utc::now(),
        };
        assert_eq!(account.primary_role().unwrap().name, "CUSTOMER");

        account.roles.clear();
        assert!(account.primary_role().is_none());
    }
}
