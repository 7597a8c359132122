// src/db.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    config::AppConfig,
    models::{
        auth::{AuthPayload, LoginInput, User},
        crm::{
            CreateCustomerInput, CreateDealInput, Customer, Deal, PaginationInput,
            UpdateCustomerInput, UpdateDealInput,
        },
        dashboard::DashboardStats,
        dataset::Dataset,
    },
    services::auth::AuthService,
};

pub mod json_repo;
pub use json_repo::JsonRepository;
pub mod postgres_repo;
pub use postgres_repo::PostgresRepository;

/// O contrato de armazenamento. O resolver GraphQL só conhece este trait;
/// qual implementação está por trás é decidido uma vez, na inicialização.
///
/// Regras comuns às duas implementações:
/// - `update_*` em id inexistente -> `AppError::NotFound`
/// - `delete_*` em id inexistente -> `Ok(false)` (delete idempotente)
/// - `delete_customer` remove também os deals do cliente
/// - `create_deal` com `customer_id` inexistente -> `NotFound("Customer")`, nada é criado
#[async_trait]
pub trait CrmRepository: Send + Sync {
    /// Nome do backend, para logs e para o /health.
    fn backend(&self) -> &'static str;

    // Ciclo de vida
    async fn connect(&self) -> Result<(), AppError>;
    async fn disconnect(&self) -> Result<(), AppError>;

    /// Substitui todo o conteúdo pelo dataset informado.
    async fn seed(&self, data: Dataset) -> Result<(), AppError>;

    // Autenticação
    async fn login(&self, input: LoginInput) -> Result<AuthPayload, AppError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;

    // Clientes
    async fn get_customers(&self, pagination: Option<PaginationInput>) -> Result<Vec<Customer>, AppError>;
    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, AppError>;
    async fn create_customer(&self, input: CreateCustomerInput) -> Result<Customer, AppError>;
    async fn update_customer(&self, id: &str, input: UpdateCustomerInput) -> Result<Customer, AppError>;
    async fn delete_customer(&self, id: &str) -> Result<bool, AppError>;

    // Deals
    async fn get_deals(&self, pagination: Option<PaginationInput>) -> Result<Vec<Deal>, AppError>;
    async fn get_deal(&self, id: &str) -> Result<Option<Deal>, AppError>;
    async fn get_deals_by_customer(&self, customer_id: &str) -> Result<Vec<Deal>, AppError>;
    async fn create_deal(&self, input: CreateDealInput) -> Result<Deal, AppError>;
    async fn update_deal(&self, id: &str, input: UpdateDealInput) -> Result<Deal, AppError>;
    async fn delete_deal(&self, id: &str) -> Result<bool, AppError>;

    // Dashboard
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, AppError>;
}

/// Escolhe o backend pela configuração: com DATABASE_URL -> Postgres,
/// sem -> arquivo JSON. Já devolve o repositório conectado.
pub async fn connect_repository(
    config: &AppConfig,
    auth: AuthService,
) -> Result<Arc<dyn CrmRepository>, AppError> {
    let repo: Arc<dyn CrmRepository> = match &config.database_url {
        Some(database_url) => Arc::new(PostgresRepository::new(
            database_url,
            config.database_max_connections,
            auth,
        )?),
        None => Arc::new(JsonRepository::new(&config.json_db_path, auth)),
    };

    repo.connect().await?;
    tracing::info!("✅ Backend '{}' conectado com sucesso!", repo.backend());

    Ok(repo)
}
