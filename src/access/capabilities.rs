// src/access/capabilities.rs

use crate::models::{access::ResourceKind, auth::Role};

/// Parâmetros por tipo de recurso que alimentam o motor de acesso.
#[derive(Debug)]
pub struct Capabilities {
    /// Único cargo que pode criar. `None` = cadastro livre.
    pub creator_role: Option<Role>,
    /// Coluna que guarda o dono do registro.
    pub owner_field: &'static str,
    pub listable_roles: &'static [Role],
    pub verifiable: bool,
}

// Cargos de gestão: podem apagar registros e verificar contas
pub const MANAGING_ROLES: &[Role] = &[Role::Owner, Role::RegionalManager, Role::Manager];

static LEAD: Capabilities = Capabilities {
    creator_role: Some(Role::Salesman),
    owner_field: "salesman_id",
    listable_roles: &[Role::Owner, Role::RegionalManager, Role::Manager, Role::Salesman],
    verifiable: false,
};

static JOB: Capabilities = Capabilities {
    creator_role: Some(Role::Technician),
    owner_field: "technician_id",
    listable_roles: &[Role::Owner, Role::RegionalManager, Role::Manager, Role::Technician],
    verifiable: false,
};

// Uma conta é "dona" de si mesma
static ACCOUNT: Capabilities = Capabilities {
    creator_role: None,
    owner_field: "id",
    listable_roles: MANAGING_ROLES,
    verifiable: true,
};

impl ResourceKind {
    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            ResourceKind::Account => &ACCOUNT,
            ResourceKind::Lead => &LEAD,
            ResourceKind::Job => &JOB,
        }
    }
}
