// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{
        AccountRepository, AccountStore, JobRepository, LeadRepository, MemoryAccountStore,
        MemoryRecordStore, RecordStore,
    },
    models::records::{Job, Lead},
    services::{AccountService, AuthService, RecordService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

// Dados do Owner inicial (SEED_OWNER_*)
#[derive(Debug, Clone)]
pub struct OwnerSeed {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub owner_seed: Option<OwnerSeed>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let storage = match env::var("STORAGE").unwrap_or_else(|_| "postgres".into()).as_str() {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE inválido: {other} (use postgres ou memory)"),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida");
        }

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let token_ttl_hours = parse_token_ttl(env::var("TOKEN_TTL_HOURS").ok().as_deref())?;
        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value.parse().context("BCRYPT_COST deve ser um número")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            storage,
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into()),
            token_ttl_hours,
            bcrypt_cost,
            owner_seed: owner_seed_from_env(),
        })
    }
}

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
// Um ano
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

fn parse_token_ttl(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TOKEN_TTL_HOURS);
    };
    let hours: i64 = raw.trim().parse().context("TOKEN_TTL_HOURS deve ser um número")?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        bail!("TOKEN_TTL_HOURS fora do intervalo: {hours} (use 1 a {MAX_TOKEN_TTL_HOURS})");
    }
    Ok(hours)
}

// Só semeia se as quatro variáveis estiverem presentes
fn owner_seed_from_env() -> Option<OwnerSeed> {
    Some(OwnerSeed {
        name: env::var("SEED_OWNER_NAME").ok()?,
        mobile: env::var("SEED_OWNER_MOBILE").ok()?,
        email: env::var("SEED_OWNER_EMAIL").ok()?,
        password: env::var("SEED_OWNER_PASSWORD").ok()?,
    })
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub account_service: AccountService,
    pub lead_service: RecordService<Lead>,
    pub job_service: RecordService<Job>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("⚠️ STORAGE=memory: os dados não sobrevivem a um restart.");
                Ok(Self::in_memory(config))
            }
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Ok(Self::from_stores(
                    config,
                    Arc::new(AccountRepository::new(db_pool.clone())),
                    Arc::new(LeadRepository::new(db_pool.clone())),
                    Arc::new(JobRepository::new(db_pool)),
                ))
            }
        }
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        Self::from_stores(
            config,
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryRecordStore::<Lead>::new()),
            Arc::new(MemoryRecordStore::<Job>::new()),
        )
    }

    // --- Monta o gráfico de dependências ---
    fn from_stores(
        config: &AppConfig,
        accounts: Arc<dyn AccountStore>,
        leads: Arc<dyn RecordStore<Lead>>,
        jobs: Arc<dyn RecordStore<Job>>,
    ) -> Self {
        Self {
            auth_service: AuthService::new(
                accounts.clone(),
                config.jwt_secret.clone(),
                chrono::Duration::hours(config.token_ttl_hours),
                config.bcrypt_cost,
            ),
            account_service: AccountService::new(accounts.clone()),
            lead_service: RecordService::new(leads, accounts.clone()),
            job_service: RecordService::new(jobs, accounts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ttl_defaults_to_a_day() {
        assert_eq!(parse_token_ttl(None).unwrap(), 24);
        assert_eq!(parse_token_ttl(Some(" 12 ")).unwrap(), 12);
        assert_eq!(parse_token_ttl(Some("8760")).unwrap(), MAX_TOKEN_TTL_HOURS);
    }

    #[test]
    fn token_ttl_out_of_range_is_rejected() {
        for raw in ["0", "-5", "8761", "99999999999", "1e3", "abc"] {
            assert!(parse_token_ttl(Some(raw)).is_err(), "{raw} deveria falhar");
        }
    }
}
