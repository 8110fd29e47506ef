// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CategoryRepository, CertificateRepository, CompanyRepository, MembershipRepository,
        OpinionRepository, RoleRepository, StatisticsRepository, UserRepository,
    },
    services::{AuthService, CompanyService, OpinionService, RelationResolver},
};

/// Configuração lida do ambiente (com `.env` opcional).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} com valor inválido: '{}'", name, raw)),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = optional_var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = optional_var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: optional_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub opinion_service: OpinionService,
    pub category_repo: CategoryRepository,
    pub certificate_repo: CertificateRepository,
    pub membership_repo: MembershipRepository,
    pub role_repo: RoleRepository,
    pub user_repo: UserRepository,
    pub statistics_repo: StatisticsRepository,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config.jwt_secret.clone()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let category_repo = CategoryRepository::new(db_pool.clone());
        let certificate_repo = CertificateRepository::new(db_pool.clone());
        let membership_repo = MembershipRepository::new(db_pool.clone());

        let resolver = RelationResolver::new(
            category_repo.clone(),
            certificate_repo.clone(),
            membership_repo.clone(),
            user_repo.clone(),
        );
        let company_service = CompanyService::new(
            db_pool.clone(),
            CompanyRepository::new(db_pool.clone()),
            resolver,
        );

        Self {
            auth_service: AuthService::new(user_repo.clone(), jwt_secret),
            company_service,
            opinion_service: OpinionService::new(
                db_pool.clone(),
                OpinionRepository::new(db_pool.clone()),
                CompanyRepository::new(db_pool.clone()),
            ),
            role_repo: RoleRepository::new(db_pool.clone()),
            statistics_repo: StatisticsRepository::new(db_pool.clone()),
            category_repo,
            certificate_repo,
            membership_repo,
            user_repo,
            db_pool,
        }
    }
}
