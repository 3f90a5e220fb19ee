// src/db/store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    access::ScopeFilter,
    common::error::AppError,
    models::{
        access::OwnerStamp,
        auth::{Account, AccountStatus, NewAccount, Role},
        records::FieldRecord,
    },
};

/// Armazenamento de Leads/Jobs. Os filtros chegam prontos do motor de acesso.
#[async_trait]
pub trait RecordStore<R: FieldRecord>: Send + Sync {
    async fn find(&self, filter: &ScopeFilter) -> Result<Vec<R>, AppError>;

    async fn find_one(&self, id: Uuid) -> Result<Option<R>, AppError>;

    async fn insert(&self, draft: R::Draft, stamp: OwnerStamp) -> Result<R, AppError>;

    /// `None` se o registro sumiu entre a leitura e a escrita.
    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<Option<R>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Armazenamento de contas. Celular, e-mail e Static ID são únicos;
/// violações viram `AppError::DuplicateAccount`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find(&self, filter: &ScopeFilter) -> Result<Vec<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_recovery(&self, mobile: &str, static_id: &str) -> Result<Option<Account>, AppError>;

    async fn insert(&self, account: NewAccount) -> Result<Account, AppError>;

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<Option<Account>, AppError>;

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;

    /// IDs das contas do cargo informado cujo nome contém o trecho (sem
    /// diferenciar maiúsculas).
    async fn search_ids_by_name(&self, fragment: &str, role: Role) -> Result<Vec<Uuid>, AppError>;

    /// Nomes das contas informadas; IDs desconhecidos ficam de fora.
    async fn names_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, AppError>;
}
