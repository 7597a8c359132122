// src/db/postgres_repo.rs

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::{
        auth::{AuthPayload, LoginInput, User},
        crm::{
            CreateCustomerInput, CreateDealInput, Customer, CustomerStatus, Deal, DealStatus,
            PaginationInput, UpdateCustomerInput, UpdateDealInput,
        },
        dashboard::DashboardStats,
        dataset::Dataset,
    },
    services::auth::AuthService,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, company, status, \
     address, notes, created_at, updated_at";

const DEAL_COLUMNS: &str = "id, title, description, value, currency, status, customer_id, \
     start_date, end_date, notes, created_at, updated_at";

// Repositório relacional. Listagens vêm da mais nova para a mais antiga.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    auth: AuthService,
}

impl PostgresRepository {
    /// Monta o pool sem abrir conexão; quem abre de fato é `connect()`.
    pub fn new(database_url: &str, max_connections: u32, auth: AuthService) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_lazy(database_url)?;

        Ok(Self::from_pool(pool, auth))
    }

    pub fn from_pool(pool: PgPool, auth: AuthService) -> Self {
        Self { pool, auth }
    }

    async fn insert_customer<'e, E>(executor: E, customer: &Customer) -> Result<Customer, AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let sql = format!(
            "INSERT INTO customers ({CUSTOMER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {CUSTOMER_COLUMNS}"
        );

        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(&customer.id)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(&customer.company)
            .bind(customer.status)
            .bind(&customer.address)
            .bind(&customer.notes)
            .bind(customer.created_at)
            .bind(customer.updated_at)
            .fetch_one(executor)
            .await?)
    }

    async fn insert_deal<'e, E>(executor: E, deal: &Deal) -> Result<Deal, AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let sql = format!(
            "INSERT INTO deals ({DEAL_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {DEAL_COLUMNS}"
        );

        sqlx::query_as::<_, Deal>(&sql)
            .bind(&deal.id)
            .bind(&deal.title)
            .bind(&deal.description)
            .bind(deal.value)
            .bind(&deal.currency)
            .bind(deal.status)
            .bind(&deal.customer_id)
            .bind(deal.start_date)
            .bind(deal.end_date)
            .bind(&deal.notes)
            .bind(deal.created_at)
            .bind(deal.updated_at)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Chave estrangeira violada = o cliente não existe
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::NotFound("Customer");
                    }
                }
                e.into()
            })
    }
}

#[async_trait]
impl CrmRepository for PostgresRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn connect(&self) -> Result<(), AppError> {
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        self.pool.close().await;
        Ok(())
    }

    async fn seed(&self, data: Dataset) -> Result<(), AppError> {
        // Tudo ou nada: se qualquer insert falhar, o rollback acontece no drop do `tx`
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM deals").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM customers").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;

        let insert_user = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        );
        for user in &data.users {
            sqlx::query(&insert_user)
                .bind(&user.id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.created_at)
                .bind(user.updated_at)
                .execute(&mut *tx)
                .await?;
        }

        for customer in &data.customers {
            Self::insert_customer(&mut *tx, customer).await?;
        }

        for deal in &data.deals {
            Self::insert_deal(&mut *tx, deal).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  AUTENTICAÇÃO
    // =========================================================================

    async fn login(&self, input: LoginInput) -> Result<AuthPayload, AppError> {
        input.validate()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(&input.username)
        .fetch_optional(&self.pool)
        .await?;

        self.auth.authenticate(user, &input.password).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    async fn get_customers(&self, pagination: Option<PaginationInput>) -> Result<Vec<Customer>, AppError> {
        let pagination = pagination.unwrap_or_default();

        Ok(sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, AppError> {
        Ok(sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_customer(&self, input: CreateCustomerInput) -> Result<Customer, AppError> {
        input.validate()?;

        let customer = input.into_customer(Uuid::new_v4().to_string());
        Self::insert_customer(&self.pool, &customer).await
    }

    async fn update_customer(&self, id: &str, input: UpdateCustomerInput) -> Result<Customer, AppError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        // Trava a linha, aplica o merge no Rust (igual ao modo arquivo) e grava
        let mut customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Customer"))?;

        input.apply_to(&mut customer);

        let updated = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET \
                first_name = $2, last_name = $3, email = $4, phone = $5, company = $6, \
                status = $7, address = $8, notes = $9, updated_at = $10 \
             WHERE id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&customer.id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.company)
        .bind(customer.status)
        .bind(&customer.address)
        .bind(&customer.notes)
        .bind(customer.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_customer(&self, id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // A FK já tem ON DELETE CASCADE, mas a cascata não depende do schema
        sqlx::query("DELETE FROM deals WHERE customer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  DEALS
    // =========================================================================

    async fn get_deals(&self, pagination: Option<PaginationInput>) -> Result<Vec<Deal>, AppError> {
        let pagination = pagination.unwrap_or_default();

        Ok(sqlx::query_as::<_, Deal>(&format!(
            "SELECT {DEAL_COLUMNS} FROM deals \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_deal(&self, id: &str) -> Result<Option<Deal>, AppError> {
        Ok(sqlx::query_as::<_, Deal>(&format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_deals_by_customer(&self, customer_id: &str) -> Result<Vec<Deal>, AppError> {
        Ok(sqlx::query_as::<_, Deal>(&format!(
            "SELECT {DEAL_COLUMNS} FROM deals WHERE customer_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_deal(&self, input: CreateDealInput) -> Result<Deal, AppError> {
        input.validate()?;

        let deal = input.into_deal(Uuid::new_v4().to_string())?;
        Self::insert_deal(&self.pool, &deal).await
    }

    async fn update_deal(&self, id: &str, input: UpdateDealInput) -> Result<Deal, AppError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        let mut deal = sqlx::query_as::<_, Deal>(&format!(
            "SELECT {DEAL_COLUMNS} FROM deals WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Deal"))?;

        input.apply_to(&mut deal)?;

        let updated = sqlx::query_as::<_, Deal>(&format!(
            "UPDATE deals SET \
                title = $2, description = $3, value = $4, currency = $5, status = $6, \
                start_date = $7, end_date = $8, notes = $9, updated_at = $10 \
             WHERE id = $1 \
             RETURNING {DEAL_COLUMNS}"
        ))
        .bind(&deal.id)
        .bind(&deal.title)
        .bind(&deal.description)
        .bind(deal.value)
        .bind(&deal.currency)
        .bind(deal.status)
        .bind(deal.start_date)
        .bind(deal.end_date)
        .bind(&deal.notes)
        .bind(deal.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_deal(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  DASHBOARD
    // =========================================================================

    // Contagens e soma em paralelo, direto no banco (sem varrer as tabelas no Rust)
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let (total_customers, active_customers, total_deals, won_deals, total_revenue) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers").fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE status = $1")
                .bind(CustomerStatus::Active)
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deals").fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deals WHERE status = $1")
                .bind(DealStatus::Won)
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, Decimal>(
                "SELECT COALESCE(SUM(value), 0) FROM deals WHERE status = $1"
            )
            .bind(DealStatus::Won)
            .fetch_one(&self.pool),
        )?;

        Ok(DashboardStats {
            total_customers,
            active_customers,
            total_deals,
            won_deals,
            total_revenue,
        })
    }
}
