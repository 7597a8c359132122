// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::Duration;

use crate::{
    db::{self, CrmRepository},
    graphql::{self, CrmSchema},
    services::auth::AuthService,
};

const DEFAULT_JWT_SECRET: &str = "default-secret-change-in-production";

// Configuração lida uma única vez na inicialização e depois só passada adiante
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    // Presente -> Postgres; ausente -> arquivo JSON
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub json_db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiration: Duration,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave -> valor.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Variável definida mas vazia conta como ausente
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(port) => port.parse().with_context(|| format!("PORT inválida: {port}"))?,
            None => 4000,
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(n) => n
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {n}"))?,
            None => 5,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET não definido, usando o segredo padrão de desenvolvimento.");
            DEFAULT_JWT_SECRET.to_string()
        });

        let jwt_expiration = match get("JWT_EXPIRATION") {
            Some(raw) => parse_duration(&raw)?,
            None => Duration::days(7),
        };

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(cost) => cost.parse().with_context(|| format!("BCRYPT_COST inválido: {cost}"))?,
            None => bcrypt::DEFAULT_COST,
        };

        let cors_origins = get("CORS_ORIGIN")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:5174".to_string(),
                ]
            });

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            json_db_path: get("JSON_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/db.json")),
            jwt_secret,
            jwt_expiration,
            bcrypt_cost,
            cors_origins,
        })
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.jwt_secret.clone(), self.jwt_expiration, self.bcrypt_cost)
    }
}

/// Aceita `30s`, `15m`, `12h`, `7d` ou só segundos (`3600`).
pub fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], Some(c)),
        _ => (raw, None),
    };

    let amount: i64 = digits
        .parse()
        .with_context(|| format!("Duração inválida: {raw}"))?;

    match unit {
        None | Some('s') => Ok(Duration::seconds(amount)),
        Some('m') => Ok(Duration::minutes(amount)),
        Some('h') => Ok(Duration::hours(amount)),
        Some('d') => Ok(Duration::days(amount)),
        Some(other) => anyhow::bail!("Unidade de duração desconhecida '{other}' em {raw}"),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Arc<dyn CrmRepository>,
    pub auth_service: AuthService,
    pub schema: CrmSchema,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let auth_service = config.auth_service();

        // --- Monta o gráfico de dependências ---
        let repo = db::connect_repository(&config, auth_service.clone()).await?;
        let schema = graphql::build_schema(repo.clone());

        Ok(Self {
            config: Arc::new(config),
            repo,
            auth_service,
            schema,
        })
    }
}
