// src/db/job_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    access::ScopeFilter,
    common::{db_utils::push_scope_filter, error::AppError},
    db::store::RecordStore,
    models::{
        access::OwnerStamp,
        records::{FieldRecord, Job, JobDraft, JobPatch},
    },
};

#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<Job> for JobRepository {
    async fn find(&self, filter: &ScopeFilter) -> Result<Vec<Job>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs WHERE TRUE");
        push_scope_filter(&mut qb, filter, Job::KIND.capabilities().owner_field);
        qb.push(" ORDER BY created_at DESC");

        let jobs = qb.build_query_as::<Job>().fetch_all(&self.pool).await?;
        Ok(jobs)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn insert(&self, draft: JobDraft, stamp: OwnerStamp) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                id, customer_name, phone, product, job_type, location,
                last_visit_date, next_visit_date, visits,
                technician_id, added_by, zone, branch
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.customer_name)
        .bind(draft.phone)
        .bind(draft.product)
        .bind(draft.job_type)
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

        Ok(job)
    }

    async fn update(&self, id: Uuid, patch: JobPatch) -> Result<Option<Job>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE jobs SET updated_at = NOW()");
        if let Some(customer_name) = patch.customer_name {
            qb.push(", customer_name = ").push_bind(customer_name);
        }
        if let Some(phone) = patch.phone {
            qb.push(", phone = ").push_bind(phone);
        }
        if let Some(product) = patch.product {
            qb.push(", product = ").push_bind(product);
        }
        if let Some(job_type) = patch.job_type {
            qb.push(", job_type = ").push_bind(job_type);
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

        let job = qb.build_query_as::<Job>().fetch_optional(&self.pool).await?;
        Ok(job)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
