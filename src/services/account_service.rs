// src/services/account_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    access::{authorize_list, authorize_mutate, authorize_zone_listing, ListHints},
    common::error::AppError,
    db::AccountStore,
    models::{
        access::{Deny, Identity, Operation, ResourceKind},
        auth::{Account, AccountListQuery, AccountStatus},
    },
};

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub async fn me(&self, identity: &Identity) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(identity.id)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    /// Contas visíveis ao chamador, mais recentes primeiro.
    pub async fn list(
        &self,
        identity: &Identity,
        query: &AccountListQuery,
    ) -> Result<Vec<Account>, AppError> {
        let hints = ListHints::from_account_query(query);
        let filter = authorize_list(identity, ResourceKind::Account, &hints);
        self.accounts.find(&filter).await
    }

    pub async fn list_zone(
        &self,
        identity: &Identity,
        zone: Option<&str>,
    ) -> Result<Vec<Account>, AppError> {
        let zone = zone.map(str::trim).filter(|z| !z.is_empty());
        let filter = authorize_zone_listing(identity, zone)?;
        self.accounts.find(&filter).await
    }

    /// Aprova ou rejeita uma conta. Também serve para reverter uma decisão.
    pub async fn verify(
        &self,
        identity: &Identity,
        account_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, AppError> {
        let target = self.accounts.find_by_id(account_id).await?;

        if let Err(deny) = authorize_mutate(
            identity,
            ResourceKind::Account,
            target.as_ref().map(Account::as_target),
            Operation::Verify,
        ) {
            tracing::warn!(
                "Verificação da conta {} negada para {} ({:?}): {:?}",
                account_id, identity.id, identity.role, deny.reason
            );
            return Err(deny.into());
        }

        let updated = self
            .accounts
            .set_status(account_id, status)
            .await?
            .ok_or_else(Deny::not_found)?;

        tracing::info!("✅ Conta {} marcada como {:?} por {}", updated.id, updated.status, identity.id);
        Ok(updated)
    }
}
