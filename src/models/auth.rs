// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- ENUMS ---

// Hierarquia de cargos: Owner → Regional Manager → Manager → Salesman/Technician
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "staff_role")]
pub enum Role {
    Owner,
    #[serde(rename = "Regional Manager")]
    #[sqlx(rename = "Regional Manager")]
    RegionalManager,
    Manager,
    Salesman,
    Technician,
}

impl Role {
    /// Cargos que este cargo pode enxergar e verificar na listagem de contas.
    pub fn subordinates(self) -> &'static [Role] {
        match self {
            Role::Owner => &[
                Role::Owner,
                Role::RegionalManager,
                Role::Manager,
                Role::Salesman,
                Role::Technician,
            ],
            Role::RegionalManager => &[Role::Manager, Role::Salesman, Role::Technician],
            Role::Manager => &[Role::Salesman, Role::Technician],
            Role::Salesman | Role::Technician => &[],
        }
    }

    pub fn is_field_staff(self) -> bool {
        matches!(self, Role::Salesman | Role::Technician)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_status")]
pub enum AccountStatus {
    Pending,
    Verified,
    Rejected,
}

// --- CONTA (funcionário) ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    #[schema(example = "9876543210")]
    pub mobile: String,
    #[schema(example = "ravi@example.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "SID482913")]
    pub static_id: String,
    pub role: Role,
    #[schema(example = "Zone A")]
    pub zone: Option<String>,
    #[schema(example = "Branch 1")]
    pub branch: Option<String>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados já validados e com senha em hash, prontos para o store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub password_hash: String,
    pub static_id: String,
    pub role: Role,
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub status: AccountStatus,
}

// --- PAYLOADS ---

fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_mobile");
        err.message = Some("Informe um celular válido com 10 dígitos.".into());
        Err(err)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Ravi Kumar")]
    pub name: String,

    #[validate(custom(function = "validate_mobile"))]
    #[schema(example = "9876543210")]
    pub mobile: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ravi@example.com")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub role: Role,
    #[schema(example = "Zone A")]
    pub zone: Option<String>,
    #[schema(example = "Branch 1")]
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(custom(function = "validate_mobile"))]
    #[schema(example = "9876543210")]
    pub mobile: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    #[validate(custom(function = "validate_mobile"))]
    #[schema(example = "9876543210")]
    pub mobile: String,

    #[validate(length(min = 1, message = "O Static ID é obrigatório."))]
    #[schema(example = "SID482913")]
    pub static_id: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyAccountPayload {
    // Repassado ao store sem checagem extra pelo motor de acesso
    pub status: AccountStatus,
}

// --- RESPOSTAS ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub static_id: String,
}

// Visão pública da conta devolvida no login
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub static_id: String,
    pub status: AccountStatus,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            role: account.role,
            zone: account.zone.clone(),
            branch: account.branch.clone(),
            static_id: account.static_id.clone(),
            status: account.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: AccountSummary,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// --- CONSULTAS ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListQuery {
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneUsersQuery {
    pub zone: Option<String>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID da conta)
    pub role: Role,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_uses_display_names_on_the_wire() {
        let json = serde_json::to_string(&Role::RegionalManager).unwrap();
        assert_eq!(json, "\"Regional Manager\"");

        let parsed: Role = serde_json::from_str("\"Technician\"").unwrap();
        assert_eq!(parsed, Role::Technician);
    }

    #[test]
    fn mobile_must_have_ten_digits() {
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("98765").is_err());
        assert!(validate_mobile("98765abcde").is_err());
    }

    #[test]
    fn managers_only_see_field_staff() {
        assert_eq!(Role::Manager.subordinates(), &[Role::Salesman, Role::Technician]);
        assert!(!Role::RegionalManager.subordinates().contains(&Role::Owner));
        assert!(Role::Salesman.subordinates().is_empty());
    }
}
