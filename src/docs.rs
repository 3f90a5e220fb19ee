// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::reset_password,

        // --- Users ---
        handlers::auth::get_me,
        handlers::accounts::list_accounts,
        handlers::accounts::list_zone_accounts,
        handlers::accounts::verify_account,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,

        // --- Jobs ---
        handlers::jobs::list_jobs,
        handlers::jobs::create_job,
        handlers::jobs::update_job,
        handlers::jobs::delete_job,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::AccountStatus,
            models::auth::Account,
            models::auth::AccountSummary,
            models::auth::RegisterAccountPayload,
            models::auth::RegisterResponse,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::ResetPasswordPayload,
            models::auth::VerifyAccountPayload,
            models::auth::MessageResponse,

            // --- Registros de campo ---
            models::records::Location,
            models::records::JobType,
            models::records::Lead,
            models::records::LeadDraft,
            models::records::LeadPatch,
            models::records::Job,
            models::records::JobDraft,
            models::records::JobPatch,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro, Login e Recuperação de Senha"),
        (name = "Users", description = "Contas da Equipe e Verificação"),
        (name = "Leads", description = "Clientes Captados por Vendedores"),
        (name = "Jobs", description = "Instalações e Serviços dos Técnicos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/api/auth/register", "/api/users/verify/{id}", "/api/leads/{id}", "/api/jobs"] {
            assert!(doc.paths.paths.contains_key(path), "faltando {path}");
        }
    }
}
