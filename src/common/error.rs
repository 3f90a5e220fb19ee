use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    access::{FilterError, ZoneListingError},
    models::access::{Deny, DenyReason, IdentityError},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Celular, e-mail ou Static ID já cadastrado")]
    DuplicateAccount,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    Unauthenticated,

    #[error("Conta pendente de verificação ou rejeitada")]
    AccountNotVerified,

    #[error("Celular ou Static ID inválido")]
    RecoveryNotFound,

    #[error("Acesso negado")]
    Denied(#[from] Deny),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ZoneListingError> for AppError {
    fn from(err: ZoneListingError) -> Self {
        match err {
            ZoneListingError::Denied(deny) => AppError::Denied(deny),
            ZoneListingError::MissingZone => AppError::BadRequest("A zona é obrigatória.".into()),
        }
    }
}

// Conta cadastrada sem zona/filial coerentes com o cargo não autentica
impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        tracing::warn!("Identidade inconsistente: {}", err);
        AppError::Unauthenticated
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateAccount => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::AccountNotVerified => StatusCode::FORBIDDEN,
            AppError::RecoveryNotFound => StatusCode::NOT_FOUND,
            AppError::Denied(deny) => match deny.reason {
                DenyReason::NotFound => StatusCode::NOT_FOUND,
                DenyReason::RoleForbidden | DenyReason::ScopeMismatch => StatusCode::FORBIDDEN,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            // Retorna todos os detalhes da validação
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::BadRequest(message) => json!({ "error": message }),
            AppError::DuplicateAccount => json!({ "error": "Celular, e-mail ou Static ID já cadastrado." }),
            AppError::InvalidCredentials => json!({ "error": "Celular ou senha inválidos." }),
            AppError::Unauthenticated => json!({ "error": "Token de autenticação inválido ou ausente." }),
            AppError::AccountNotVerified => {
                json!({ "error": "Sua conta está pendente de verificação ou foi rejeitada." })
            }
            AppError::RecoveryNotFound => json!({ "error": "Celular ou Static ID inválido." }),
            AppError::Denied(deny) => {
                let message = match deny.reason {
                    DenyReason::NotFound => "Registro não encontrado.",
                    DenyReason::ScopeMismatch => "O registro está fora da sua zona, filial ou carteira.",
                    DenyReason::RoleForbidden => "Seu cargo não permite esta operação.",
                };
                json!({ "error": message, "reason": deny.reason })
            }

            // Todos os outros erros viram 500; o detalhe só vai para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_reasons_map_to_transport_codes() {
        assert_eq!(AppError::from(Deny::not_found()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(Deny::scope_mismatch()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::from(Deny::role_forbidden()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_zone_is_a_bad_request() {
        let err = AppError::from(ZoneListingError::MissingZone);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
