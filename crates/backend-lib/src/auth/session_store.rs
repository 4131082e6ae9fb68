// ============================
// crates/backend-lib/src/auth/session_store.rs
// ============================
//! Refresh-token session records and the store contract.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

/// One tracked refresh-token session. Access tokens minted against it
/// are stateless and never stored.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: Uuid,
    /// The refresh token string; globally unique across all records
    pub value: String,
    pub owner_id: Uuid,
    /// True once past the validity window or explicitly invalidated
    pub expired: bool,
    /// True on explicit invalidation; a one-way transition
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Whether the record still authorizes refresh calls
    pub fn is_active(&self) -> bool {
        !self.expired && !self.revoked
    }
}

/// Trait for session record store backends.
///
/// Multi-step lifecycle operations must not be observable half-applied,
/// so the login path goes through `supersede_for_owner` rather than
/// composing `bulk_invalidate` + `insert` across two calls.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new active record; fails with `DuplicateKey` if `value`
    /// already exists
    async fn insert(
        &self,
        value: &str,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError>;

    /// Look up a record by its token value
    async fn find_by_value(&self, value: &str) -> Result<Option<SessionRecord>, AppError>;

    /// All records for an owner, unordered, dead ones included
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<SessionRecord>, AppError>;

    /// Mark the given records expired+revoked. Idempotent per record;
    /// unknown ids are skipped.
    async fn bulk_invalidate(
        &self,
        ids: &[Uuid],
        revoked_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Invalidate every record of `owner_id` and insert a fresh one, as a
    /// single all-or-nothing transition. A `DuplicateKey` on `value` leaves
    /// the existing records untouched.
    async fn supersede_for_owner(
        &self,
        owner_id: Uuid,
        value: &str,
        created_at: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError>;

    /// Hard-remove all records for an owner. Exposed for the
    /// account-management collaborator when an account is deleted.
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<usize, AppError>;
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<Uuid, SessionRecord>,
    by_value: HashMap<String, Uuid>,
}

impl StoreInner {
    fn insert_record(
        &mut self,
        value: &str,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError> {
        if self.by_value.contains_key(value) {
            return Err(AppError::DuplicateKey);
        }

        let record = SessionRecord {
            id: Uuid::new_v4(),
            value: value.to_string(),
            owner_id,
            expired: false,
            revoked: false,
            created_at,
            revoked_at: None,
        };

        self.by_value.insert(record.value.clone(), record.id);
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn invalidate(&mut self, id: Uuid, revoked_at: DateTime<Utc>) {
        if let Some(record) = self.records.get_mut(&id) {
            record.expired = true;
            if !record.revoked {
                record.revoked = true;
                record.revoked_at = Some(revoked_at);
            }
        }
    }
}

/// In-memory implementation of the `SessionStore` trait. One write guard
/// per unit of work, so no reader observes a half-applied transition.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(
        &self,
        value: &str,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError> {
        let mut inner = self.inner.write().await;
        inner.insert_record(value, owner_id, created_at)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<SessionRecord>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_value
            .get(value)
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<SessionRecord>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn bulk_invalidate(
        &self,
        ids: &[Uuid],
        revoked_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        for id in ids {
            inner.invalidate(*id, revoked_at);
        }
        Ok(())
    }

    async fn supersede_for_owner(
        &self,
        owner_id: Uuid,
        value: &str,
        created_at: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError> {
        let mut inner = self.inner.write().await;

        // duplicate check before any invalidation keeps this all-or-nothing
        if inner.by_value.contains_key(value) {
            return Err(AppError::DuplicateKey);
        }

        let ids: Vec<Uuid> = inner
            .records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.id)
            .collect();
        for id in ids {
            inner.invalidate(id, created_at);
        }

        inner.insert_record(value, owner_id, created_at)
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<usize, AppError> {
        let mut inner = self.inner.write().await;

        let ids: Vec<Uuid> = inner
            .records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.id)
            .collect();
        for id in &ids {
            if let Some(record) = inner.records.remove(id) {
                inner.by_value.remove(&record.value);
            }
        }

        Ok(ids.len())
    }
}
