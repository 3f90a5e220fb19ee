// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentIdentity,
    models::auth::{
        Account, AccountSummary, AuthResponse, LoginPayload, MessageResponse, RegisterAccountPayload,
        RegisterResponse, ResetPasswordPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterAccountPayload,
    responses(
        (status = 201, description = "Conta criada, aguardando verificação", body = RegisterResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Celular, e-mail ou Static ID já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let account = app_state.auth_service.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Cadastro realizado. Aguarde a verificação da sua conta.".into(),
            static_id: account.static_id,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Conta pendente ou rejeitada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let (account, token) = app_state
        .auth_service
        .login(&payload.mobile, &payload.password)
        .await?;

    Ok(Json(AuthResponse { user: AccountSummary::from(&account), token }))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida", body = MessageResponse),
        (status = 404, description = "Celular ou Static ID inválido")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    app_state
        .auth_service
        .reset_password(&payload.mobile, &payload.static_id, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse { message: "Senha redefinida com sucesso.".into() }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Conta autenticada", body = Account),
        (status = 401, description = "Token inválido ou ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<Account>, AppError> {
    let account = app_state.account_service.me(&identity).await?;
    Ok(Json(account))
}
