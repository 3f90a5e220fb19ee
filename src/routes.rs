// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": Utc::now() }))
}

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/reset-password", post(handlers::auth::reset_password));

    // Tudo abaixo exige Bearer token de uma conta verificada
    let protected_routes = Router::new()
        .route("/api/users", get(handlers::accounts::list_accounts))
        .route("/api/users/me", get(handlers::auth::get_me))
        .route("/api/users/zone-users", get(handlers::accounts::list_zone_accounts))
        .route("/api/users/verify/{id}", patch(handlers::accounts::verify_account))
        .route(
            "/api/leads",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route(
            "/api/leads/{id}",
            put(handlers::leads::update_lead).delete(handlers::leads::delete_lead),
        )
        .route(
            "/api/jobs",
            get(handlers::jobs::list_jobs).post(handlers::jobs::create_job),
        )
        .route(
            "/api/jobs/{id}",
            put(handlers::jobs::update_job).delete(handlers::jobs::delete_job),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
