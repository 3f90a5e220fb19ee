// src/services/record_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    access::{authorize_create, authorize_list, authorize_mutate, ListHints},
    common::error::AppError,
    db::{AccountStore, RecordStore},
    models::{
        access::{Deny, Identity, Operation},
        records::{FieldRecord, RecordListQuery},
    },
};

/// Leads e Jobs passam pelo mesmo fluxo: motor de acesso primeiro, store depois.
pub struct RecordService<R: FieldRecord> {
    records: Arc<dyn RecordStore<R>>,
    accounts: Arc<dyn AccountStore>,
}

impl<R: FieldRecord> Clone for RecordService<R> {
    fn clone(&self) -> Self {
        Self { records: self.records.clone(), accounts: self.accounts.clone() }
    }
}

impl<R: FieldRecord> RecordService<R> {
    pub fn new(records: Arc<dyn RecordStore<R>>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { records, accounts }
    }

    pub async fn list(&self, identity: &Identity, query: &RecordListQuery) -> Result<Vec<R>, AppError> {
        let mut hints = ListHints::from_record_query(query)?;

        // Busca por nome do dono: só entre contas do cargo que cria o registro
        let creator_role = R::KIND.capabilities().creator_role;
        if let (Some(name), Some(role)) = (query.owner_name.as_deref().map(str::trim), creator_role) {
            if !name.is_empty() {
                hints.owner_ids = Some(self.accounts.search_ids_by_name(name, role).await?);
            }
        }

        let filter = authorize_list(identity, R::KIND, &hints);
        let records = self.records.find(&filter).await?;
        self.with_owner_names(records).await
    }

    pub async fn create(&self, identity: &Identity, draft: R::Draft) -> Result<R, AppError> {
        let stamp = authorize_create(identity, R::KIND).inspect_err(|deny| {
            tracing::warn!("Criação de {:?} negada para {} ({:?}): {:?}", R::KIND, identity.id, identity.role, deny.reason);
        })?;

        let record = self.records.insert(draft, stamp).await?;
        tracing::info!("{:?} {} criado por {}", R::KIND, record.id(), identity.id);
        self.with_owner_name(record).await
    }

    pub async fn update(&self, identity: &Identity, id: Uuid, patch: R::Patch) -> Result<R, AppError> {
        self.authorize(identity, id, Operation::Update).await?;

        let updated = self.records.update(id, patch).await?.ok_or_else(Deny::not_found)?;
        tracing::info!("{:?} {} atualizado por {}", R::KIND, id, identity.id);
        self.with_owner_name(updated).await
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), AppError> {
        self.authorize(identity, id, Operation::Delete).await?;

        if !self.records.delete(id).await? {
            return Err(Deny::not_found().into());
        }
        tracing::info!("🗑️ {:?} {} removido por {}", R::KIND, id, identity.id);
        Ok(())
    }

    // Equivalente ao "populate": devolve o nome do dono junto com o registro
    async fn with_owner_names(&self, mut records: Vec<R>) -> Result<Vec<R>, AppError> {
        let mut owner_ids: Vec<Uuid> = records.iter().map(R::owner).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let names = self.accounts.names_by_ids(&owner_ids).await?;
        for record in &mut records {
            record.set_owner_name(names.get(&record.owner()).cloned());
        }
        Ok(records)
    }

    async fn with_owner_name(&self, mut record: R) -> Result<R, AppError> {
        let names = self.accounts.names_by_ids(&[record.owner()]).await?;
        record.set_owner_name(names.get(&record.owner()).cloned());
        Ok(record)
    }

    async fn authorize(&self, identity: &Identity, id: Uuid, operation: Operation) -> Result<(), AppError> {
        let target = self.records.find_one(id).await?;

        authorize_mutate(identity, R::KIND, target.as_ref().map(R::as_target), operation).map_err(|deny| {
            tracing::warn!(
                "{:?} sobre {:?} {} negado para {} ({:?}): {:?}",
                operation, R::KIND, id, identity.id, identity.role, deny.reason
            );
            AppError::from(deny)
        })
    }
}
