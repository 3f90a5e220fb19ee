// src/handlers/jobs.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentIdentity,
    models::{
        auth::MessageResponse,
        records::{Job, JobDraft, JobPatch, RecordListQuery},
    },
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "Jobs",
    params(
        ("zone" = Option<String>, Query, description = "Zona (só o Owner pode escolher)"),
        ("branch" = Option<String>, Query, description = "Filial (só o Owner pode escolher)"),
        ("technicianName" = Option<String>, Query, description = "Trecho do nome do técnico"),
        ("nextVisit" = Option<String>, Query, description = "true/false: com ou sem próxima visita"),
        ("hasVisit" = Option<String>, Query, description = "true/false: visitas > 0 ou = 0"),
        ("dateFrom" = Option<String>, Query, description = "Próxima visita a partir de (YYYY-MM-DD)"),
        ("dateTo" = Option<String>, Query, description = "Próxima visita até (YYYY-MM-DD, inclusivo)")
    ),
    responses(
        (status = 200, description = "Jobs visíveis ao chamador", body = [Job]),
        (status = 400, description = "Data inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_jobs(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<RecordListQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = app_state.job_service.list(&identity, &query).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "Jobs",
    request_body = JobDraft,
    responses(
        (status = 201, description = "Job criado", body = Job),
        (status = 403, description = "Só técnicos criam jobs")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_job(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(payload): Json<JobDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let job = app_state.job_service.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    request_body = JobPatch,
    params(("id" = Uuid, Path, description = "ID do Job")),
    responses(
        (status = 200, description = "Job atualizado", body = Job),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Fora do escopo ou cargo sem permissão"),
        (status = 404, description = "Job não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_job(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<JobPatch>,
) -> Result<Json<Job>, AppError> {
    payload.validate()?;

    let job = app_state.job_service.update(&identity, job_id, payload).await?;
    Ok(Json(job))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "ID do Job")),
    responses(
        (status = 200, description = "Job removido", body = MessageResponse),
        (status = 403, description = "Fora do escopo ou cargo sem permissão"),
        (status = 404, description = "Job não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_job(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(job_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.job_service.delete(&identity, job_id).await?;
    Ok(Json(MessageResponse { message: "Job removido com sucesso.".into() }))
}
