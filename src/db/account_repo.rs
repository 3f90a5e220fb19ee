// src/db/account_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    access::ScopeFilter,
    common::{
        db_utils::{like_pattern, push_scope_filter},
        error::AppError,
    },
    db::store::AccountStore,
    models::{
        access::ResourceKind,
        auth::{Account, AccountStatus, NewAccount, Role},
    },
};

// O repositório de contas, responsável por todas as interações com a tabela 'accounts'
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn find(&self, filter: &ScopeFilter) -> Result<Vec<Account>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM accounts WHERE TRUE");
        push_scope_filter(&mut qb, filter, ResourceKind::Account.capabilities().owner_field);
        qb.push(" ORDER BY created_at DESC");

        let accounts = qb.build_query_as::<Account>().fetch_all(&self.pool).await?;
        Ok(accounts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let maybe_account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_account)
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Account>, AppError> {
        let maybe_account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE mobile = $1")
            .bind(mobile)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_account)
    }

    async fn find_by_recovery(&self, mobile: &str, static_id: &str) -> Result<Option<Account>, AppError> {
        let maybe_account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE mobile = $1 AND static_id = $2",
        )
        .bind(mobile)
        .bind(static_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_account)
    }

    // Cria uma nova conta. Violação de chave única (celular, e-mail ou
    // Static ID) vira um erro de validação genérico.
    async fn insert(&self, account: NewAccount) -> Result<Account, AppError> {
        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (
                id, name, mobile, email, password_hash, static_id,
                role, zone, branch, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.name)
        .bind(&account.mobile)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.static_id)
        .bind(account.role)
        .bind(&account.zone)
        .bind(&account.branch)
        .bind(account.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateAccount;
                }
            }
            e.into()
        })?;

        Ok(created)
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<Option<Account>, AppError> {
        let updated = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search_ids_by_name(&self, fragment: &str, role: Role) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM accounts WHERE role = $1 AND name ILIKE $2",
        )
        .bind(role)
        .bind(like_pattern(fragment))
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn names_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM accounts WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }
}
