// src/handlers/accounts.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentIdentity,
    models::auth::{Account, AccountListQuery, AccountStatus, Role, VerifyAccountPayload, ZoneUsersQuery},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(
        ("zone" = Option<String>, Query, description = "Zona (só o Owner pode escolher)"),
        ("branch" = Option<String>, Query, description = "Filial (só o Owner pode escolher)"),
        ("role" = Option<Role>, Query, description = "Filtra por cargo, dentro dos cargos permitidos"),
        ("status" = Option<AccountStatus>, Query, description = "Pending, Verified ou Rejected")
    ),
    responses(
        (status = 200, description = "Contas visíveis ao chamador", body = [Account])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = app_state.account_service.list(&identity, &query).await?;
    Ok(Json(accounts))
}

#[utoipa::path(
    get,
    path = "/api/users/zone-users",
    tag = "Users",
    params(
        ("zone" = Option<String>, Query, description = "Obrigatória para o Owner")
    ),
    responses(
        (status = 200, description = "Contas da zona, sem Owners", body = [Account]),
        (status = 400, description = "Zona não informada"),
        (status = 403, description = "Cargo sem acesso")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_zone_accounts(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<ZoneUsersQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = app_state
        .account_service
        .list_zone(&identity, query.zone.as_deref())
        .await?;
    Ok(Json(accounts))
}

#[utoipa::path(
    patch,
    path = "/api/users/verify/{id}",
    tag = "Users",
    request_body = VerifyAccountPayload,
    params(
        ("id" = Uuid, Path, description = "ID da conta")
    ),
    responses(
        (status = 200, description = "Status atualizado", body = Account),
        (status = 403, description = "Fora do escopo ou cargo sem permissão"),
        (status = 404, description = "Conta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_account(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<VerifyAccountPayload>,
) -> Result<Json<Account>, AppError> {
    let account = app_state
        .account_service
        .verify(&identity, account_id, payload.status)
        .await?;
    Ok(Json(account))
}
