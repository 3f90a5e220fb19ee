// src/models/access.rs

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{Account, Role};

// O chamador já autenticado, como resolvido a partir do token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub zone: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("conta {0} sem zona atribuída")]
    MissingZone(Uuid),
    #[error("conta {0} de gerente sem filial atribuída")]
    MissingBranch(Uuid),
}

impl Identity {
    /// Todo cargo exceto Owner tem zona; Manager também precisa de filial.
    pub fn new(
        id: Uuid,
        role: Role,
        zone: Option<String>,
        branch: Option<String>,
    ) -> Result<Self, IdentityError> {
        if role != Role::Owner && zone.is_none() {
            return Err(IdentityError::MissingZone(id));
        }
        if role == Role::Manager && branch.is_none() {
            return Err(IdentityError::MissingBranch(id));
        }
        Ok(Self { id, role, zone, branch })
    }
}

impl TryFrom<&Account> for Identity {
    type Error = IdentityError;

    fn try_from(account: &Account) -> Result<Self, Self::Error> {
        Identity::new(account.id, account.role, account.zone.clone(), account.branch.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Account,
    Lead,
    Job,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Update,
    Delete,
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    NotFound,
    ScopeMismatch,
    RoleForbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("acesso negado: {reason:?}")]
pub struct Deny {
    pub reason: DenyReason,
}

impl Deny {
    pub fn not_found() -> Self {
        Self { reason: DenyReason::NotFound }
    }

    pub fn scope_mismatch() -> Self {
        Self { reason: DenyReason::ScopeMismatch }
    }

    pub fn role_forbidden() -> Self {
        Self { reason: DenyReason::RoleForbidden }
    }
}

// Campos de posse/localização forçados a partir de quem cria o registro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerStamp {
    pub owner: Uuid,
    pub added_by: Uuid,
    pub zone: Option<String>,
    pub branch: Option<String>,
}

// O alvo já buscado de uma mutação, reduzido ao que o motor precisa
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Record {
        added_by: Uuid,
        zone: Option<&'a str>,
        branch: Option<&'a str>,
    },
    Account {
        role: Role,
        zone: Option<&'a str>,
        branch: Option<&'a str>,
    },
}

impl<'a> Target<'a> {
    pub fn zone(&self) -> Option<&'a str> {
        match self {
            Target::Record { zone, .. } | Target::Account { zone, .. } => *zone,
        }
    }

    pub fn branch(&self) -> Option<&'a str> {
        match self {
            Target::Record { branch, .. } | Target::Account { branch, .. } => *branch,
        }
    }
}

impl Account {
    pub fn as_target(&self) -> Target<'_> {
        Target::Account {
            role: self.role,
            zone: self.zone.as_deref(),
            branch: self.branch.as_deref(),
        }
    }
}
