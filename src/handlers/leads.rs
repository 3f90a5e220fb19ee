// src/handlers/leads.rs

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
        records::{Lead, LeadDraft, LeadPatch, RecordListQuery},
    },
};

#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(
        ("zone" = Option<String>, Query, description = "Zona (só o Owner pode escolher)"),
        ("branch" = Option<String>, Query, description = "Filial (só o Owner pode escolher)"),
        ("salesmanName" = Option<String>, Query, description = "Trecho do nome do vendedor"),
        ("nextVisit" = Option<String>, Query, description = "true/false: com ou sem próxima visita"),
        ("hasVisit" = Option<String>, Query, description = "true/false: visitas > 0 ou = 0"),
        ("dateFrom" = Option<String>, Query, description = "Próxima visita a partir de (YYYY-MM-DD)"),
        ("dateTo" = Option<String>, Query, description = "Próxima visita até (YYYY-MM-DD, inclusivo)")
    ),
    responses(
        (status = 200, description = "Leads visíveis ao chamador", body = [Lead]),
        (status = 400, description = "Data inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<RecordListQuery>,
) -> Result<Json<Vec<Lead>>, AppError> {
    let leads = app_state.lead_service.list(&identity, &query).await?;
    Ok(Json(leads))
}

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = LeadDraft,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 403, description = "Só vendedores criam leads")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(payload): Json<LeadDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state.lead_service.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = LeadPatch,
    params(("id" = Uuid, Path, description = "ID do Lead")),
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Fora do escopo ou cargo sem permissão"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<LeadPatch>,
) -> Result<Json<Lead>, AppError> {
    payload.validate()?;

    let lead = app_state.lead_service.update(&identity, lead_id, payload).await?;
    Ok(Json(lead))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do Lead")),
    responses(
        (status = 200, description = "Lead removido", body = MessageResponse),
        (status = 403, description = "Fora do escopo ou cargo sem permissão"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.lead_service.delete(&identity, lead_id).await?;
    Ok(Json(MessageResponse { message: "Lead removido com sucesso.".into() }))
}
