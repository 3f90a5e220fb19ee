// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    access::ScopeFilter,
    common::error::AppError,
    config::OwnerSeed,
    db::AccountStore,
    models::{
        access::Identity,
        auth::{Account, AccountStatus, Claims, NewAccount, RegisterAccountPayload, Role},
    },
};

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        jwt_secret: String,
        token_ttl: chrono::Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self { accounts, jwt_secret, token_ttl, bcrypt_cost }
    }

    /// Autocadastro: qualquer um pode se registrar, sempre como Pending.
    pub async fn register(&self, payload: RegisterAccountPayload) -> Result<Account, AppError> {
        check_placement(payload.role, payload.zone.as_deref(), payload.branch.as_deref())?;

        let password_hash = self.hash_password(&payload.password).await?;

        let account = self
            .accounts
            .insert(NewAccount {
                name: payload.name,
                mobile: payload.mobile,
                email: payload.email,
                password_hash,
                static_id: generate_static_id(),
                role: payload.role,
                zone: payload.zone,
                branch: payload.branch,
                status: AccountStatus::Pending,
            })
            .await?;

        tracing::info!("📝 Nova conta {} ({:?}) aguardando verificação.", account.id, account.role);
        Ok(account)
    }

    pub async fn login(&self, mobile: &str, password: &str) -> Result<(Account, String), AppError> {
        let account = self
            .accounts
            .find_by_mobile(mobile)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = account.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if account.status != AccountStatus::Verified {
            return Err(AppError::AccountNotVerified);
        }

        let token = self.create_token(&account)?;
        Ok((account, token))
    }

    /// Redefine a senha usando o par (celular, Static ID).
    pub async fn reset_password(
        &self,
        mobile: &str,
        static_id: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let account = self
            .accounts
            .find_by_recovery(mobile, static_id)
            .await?
            .ok_or(AppError::RecoveryNotFound)?;

        let password_hash = self.hash_password(new_password).await?;
        self.accounts.set_password(account.id, &password_hash).await?;

        tracing::info!("🔑 Senha redefinida para a conta {}", account.id);
        Ok(())
    }

    /// Resolve o token em uma identidade. Só contas verificadas passam.
    pub async fn resolve_identity(&self, token: &str) -> Result<Identity, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::Unauthenticated)?;

        let account = self
            .accounts
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        if account.status != AccountStatus::Verified {
            return Err(AppError::AccountNotVerified);
        }

        Ok(Identity::try_from(&account)?)
    }

    /// Cria o Owner inicial se ainda não existir nenhum.
    pub async fn ensure_owner(&self, seed: &OwnerSeed) -> Result<bool, AppError> {
        let owners = ScopeFilter { roles: Some(vec![Role::Owner]), ..ScopeFilter::everything() };
        if !self.accounts.find(&owners).await?.is_empty() {
            tracing::info!("Owner já existe, nada a semear.");
            return Ok(false);
        }

        let password_hash = self.hash_password(&seed.password).await?;
        let owner = self
            .accounts
            .insert(NewAccount {
                name: seed.name.clone(),
                mobile: seed.mobile.clone(),
                email: seed.email.clone(),
                password_hash,
                static_id: generate_static_id(),
                role: Role::Owner,
                zone: None,
                branch: None,
                status: AccountStatus::Verified,
            })
            .await?;

        tracing::info!("✅ Owner {} criado com sucesso.", owner.id);
        Ok(true)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    fn create_token(&self, account: &Account) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: account.id,
            role: account.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// Zona obrigatória para todo cargo exceto Owner; filial obrigatória para Manager
fn check_placement(role: Role, zone: Option<&str>, branch: Option<&str>) -> Result<(), AppError> {
    let blank = |v: Option<&str>| v.is_none_or(|v| v.trim().is_empty());
    if role != Role::Owner && blank(zone) {
        return Err(AppError::BadRequest("A zona é obrigatória para este cargo.".into()));
    }
    if role == Role::Manager && blank(branch) {
        return Err(AppError::BadRequest("A filial é obrigatória para gerentes.".into()));
    }
    Ok(())
}

// "SID" + 6 dígitos
fn generate_static_id() -> String {
    let n = 100_000 + (Uuid::new_v4().as_u128() % 900_000);
    format!("SID{n}")
}
