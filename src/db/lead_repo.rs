// src/db/lead_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    access::ScopeFilter,
    common::{db_utils::push_scope_filter, error::AppError},
    db::store::RecordStore,
    models::{
        access::OwnerStamp,
        records::{FieldRecord, Lead, LeadDraft, LeadPatch},
    },
};

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<Lead> for LeadRepository {
    async fn find(&self, filter: &ScopeFilter) -> Result<Vec<Lead>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM leads WHERE TRUE");
        push_scope_filter(&mut qb, filter, Lead::KIND.capabilities().owner_field);
        qb.push(" ORDER BY created_at DESC");

        let leads = qb.build_query_as::<Lead>().fetch_all(&self.pool).await?;
        Ok(leads)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    // Zona, filial e dono vêm sempre do carimbo, nunca do payload
    async fn insert(&self, draft: LeadDraft, stamp: OwnerStamp) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                id, name, phone, product_model, location,
                last_visit_date, next_visit_date, visits,
                salesman_id, added_by, zone, branch
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.name)
        .bind(draft.phone)
        .bind(draft.product_model)
        .bind(draft.location.map(Json))
        .bind(draft.last_visit_date)
        .bind(draft.next_visit_date)
        .bind(draft.visits)
        .bind(stamp.owner)
        .bind(stamp.added_by)
        .bind(stamp.zone)
        .bind(stamp.branch)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn update(&self, id: Uuid, patch: LeadPatch) -> Result<Option<Lead>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE leads SET updated_at = NOW()");
        if let Some(name) = patch.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(phone) = patch.phone {
            qb.push(", phone = ").push_bind(phone);
        }
        if let Some(product_model) = patch.product_model {
            qb.push(", product_model = ").push_bind(product_model);
        }
        if let Some(location) = patch.location {
            qb.push(", location = ").push_bind(Json(location));
        }
        if let Some(date) = patch.last_visit_date {
            qb.push(", last_visit_date = ").push_bind(date);
        }
        if let Some(date) = patch.next_visit_date {
            qb.push(", next_visit_date = ").push_bind(date);
        }
        if let Some(visits) = patch.visits {
            qb.push(", visits = ").push_bind(visits);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        let lead = qb.build_query_as::<Lead>().fetch_optional(&self.pool).await?;
        Ok(lead)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
