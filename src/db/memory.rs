// src/db/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    access::ScopeFilter,
    common::error::AppError,
    db::store::{AccountStore, RecordStore},
    models::{
        access::OwnerStamp,
        auth::{Account, AccountStatus, NewAccount, Role},
        records::FieldRecord,
    },
};

// Store em memória para desenvolvimento (STORAGE=memory) e testes
pub struct MemoryRecordStore<R> {
    records: RwLock<HashMap<Uuid, R>>,
}

impl<R> MemoryRecordStore<R> {
    pub fn new() -> Self {
        Self { records: RwLock::new(HashMap::new()) }
    }
}

impl<R> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: FieldRecord> RecordStore<R> for MemoryRecordStore<R> {
    async fn find(&self, filter: &ScopeFilter) -> Result<Vec<R>, AppError> {
        let records = self.records.read().await;
        let mut found: Vec<R> = records.values().filter(|r| filter.matches_record(*r)).cloned().collect();
        found.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        Ok(found)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<R>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn insert(&self, draft: R::Draft, stamp: OwnerStamp) -> Result<R, AppError> {
        let record = R::from_draft(draft, stamp);
        self.records.write().await.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<Option<R>, AppError> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|record| {
            record.apply_patch(patch);
            record.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find(&self, filter: &ScopeFilter) -> Result<Vec<Account>, AppError> {
        let accounts = self.accounts.read().await;
        let mut found: Vec<Account> =
            accounts.values().filter(|a| filter.matches_account(a)).cloned().collect();
        // Mais recentes primeiro
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.mobile == mobile).cloned())
    }

    async fn find_by_recovery(&self, mobile: &str, static_id: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.mobile == mobile && a.static_id == static_id)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;
        let duplicate = accounts.values().any(|a| {
            a.mobile == account.mobile || a.email == account.email || a.static_id == account.static_id
        });
        if duplicate {
            return Err(AppError::DuplicateAccount);
        }

        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            name: account.name,
            mobile: account.mobile,
            email: account.email,
            password_hash: account.password_hash,
            static_id: account.static_id,
            role: account.role,
            zone: account.zone,
            branch: account.branch,
            status: account.status,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<Option<Account>, AppError> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(&id).map(|account| {
            account.status = status;
            account.updated_at = Utc::now();
            account.clone()
        }))
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        if let Some(account) = self.accounts.write().await.get_mut(&id) {
            account.password_hash = password_hash.to_string();
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn search_ids_by_name(&self, fragment: &str, role: Role) -> Result<Vec<Uuid>, AppError> {
        let needle = fragment.to_lowercase();
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| a.role == role && a.name.to_lowercase().contains(&needle))
            .map(|a| a.id)
            .collect())
    }

    async fn names_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| accounts.get(id).map(|a| (*id, a.name.clone())))
            .collect())
    }
}
