// src/db/json_repo.rs

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::{fs, sync::RwLock};
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

// Repositório em arquivo: tudo fica em memória e o documento inteiro é
// regravado a cada mutação. Sem índices: toda busca é uma varredura linear.
pub struct JsonRepository {
    path: PathBuf,
    // A trava de escrita fica presa até o arquivo ser gravado,
    // então duas mutações nunca se intercalam.
    data: RwLock<Dataset>,
    auth: AuthService,
}

impl JsonRepository {
    pub fn new(path: impl Into<PathBuf>, auth: AuthService) -> Self {
        Self {
            path: path.into(),
            data: RwLock::new(Dataset::default()),
            auth,
        }
    }

    // Grava num arquivo temporário e renomeia: ou fica o documento antigo, ou o novo.
    async fn save(&self, data: &Dataset) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let contents = serde_json::to_vec_pretty(data)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).await?;
        fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!("💾 Documento salvo em {}", self.path.display());
        Ok(())
    }

    // `<millis>-<sufixo aleatório>`, refeito se já existir na coleção
    fn generate_id(exists: impl Fn(&str) -> bool) -> String {
        loop {
            let suffix = Uuid::new_v4().simple().to_string();
            let id = format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..9]);
            if !exists(&id) {
                return id;
            }
        }
    }
}

#[async_trait]
impl CrmRepository for JsonRepository {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn connect(&self) -> Result<(), AppError> {
        let mut data = self.data.write().await;

        match fs::read(&self.path).await {
            Ok(contents) => {
                *data = serde_json::from_slice(&contents)?;
                tracing::info!(
                    "📂 {} carregado: {} usuários, {} clientes, {} deals",
                    self.path.display(),
                    data.users.len(),
                    data.customers.len(),
                    data.deals.len()
                );
            }
            // Arquivo inexistente = base vazia. Arquivo corrompido NÃO cai aqui.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Arquivo {} não existe, iniciando vazio.", self.path.display());
                *data = Dataset::default();
                self.save(&data).await?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        let data = self.data.read().await;
        self.save(&data).await
    }

    async fn seed(&self, dataset: Dataset) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        *data = dataset;
        self.save(&data).await
    }

    // =========================================================================
    //  AUTENTICAÇÃO
    // =========================================================================

    async fn login(&self, input: LoginInput) -> Result<AuthPayload, AppError> {
        input.validate()?;

        let user = {
            let data = self.data.read().await;
            data.users.iter().find(|u| u.username == input.username).cloned()
        };

        self.auth.authenticate(user, &input.password).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    async fn get_customers(&self, pagination: Option<PaginationInput>) -> Result<Vec<Customer>, AppError> {
        let data = self.data.read().await;
        Ok(pagination.unwrap_or_default().slice(&data.customers).to_vec())
    }

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, AppError> {
        let data = self.data.read().await;
        Ok(data.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn create_customer(&self, input: CreateCustomerInput) -> Result<Customer, AppError> {
        input.validate()?;

        let mut data = self.data.write().await;
        let id = Self::generate_id(|id| data.customers.iter().any(|c| c.id == id));
        let customer = input.into_customer(id);

        data.customers.push(customer.clone());
        self.save(&data).await?;

        Ok(customer)
    }

    async fn update_customer(&self, id: &str, input: UpdateCustomerInput) -> Result<Customer, AppError> {
        input.validate()?;

        let mut data = self.data.write().await;
        let customer = data
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound("Customer"))?;

        input.apply_to(customer);
        let updated = customer.clone();
        self.save(&data).await?;

        Ok(updated)
    }

    async fn delete_customer(&self, id: &str) -> Result<bool, AppError> {
        let mut data = self.data.write().await;
        let Some(index) = data.customers.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        data.customers.remove(index);
        // Cascata: os deals do cliente vão junto
        data.deals.retain(|d| d.customer_id != id);
        self.save(&data).await?;

        Ok(true)
    }

    // =========================================================================
    //  DEALS
    // =========================================================================

    async fn get_deals(&self, pagination: Option<PaginationInput>) -> Result<Vec<Deal>, AppError> {
        let data = self.data.read().await;
        Ok(pagination.unwrap_or_default().slice(&data.deals).to_vec())
    }

    async fn get_deal(&self, id: &str) -> Result<Option<Deal>, AppError> {
        let data = self.data.read().await;
        Ok(data.deals.iter().find(|d| d.id == id).cloned())
    }

    async fn get_deals_by_customer(&self, customer_id: &str) -> Result<Vec<Deal>, AppError> {
        let data = self.data.read().await;
        Ok(data
            .deals
            .iter()
            .filter(|d| d.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn create_deal(&self, input: CreateDealInput) -> Result<Deal, AppError> {
        input.validate()?;

        let mut data = self.data.write().await;
        if !data.customers.iter().any(|c| c.id == input.customer_id.as_str()) {
            return Err(AppError::NotFound("Customer"));
        }

        let id = Self::generate_id(|id| data.deals.iter().any(|d| d.id == id));
        let deal = input.into_deal(id)?;

        data.deals.push(deal.clone());
        self.save(&data).await?;

        Ok(deal)
    }

    async fn update_deal(&self, id: &str, input: UpdateDealInput) -> Result<Deal, AppError> {
        input.validate()?;

        let mut data = self.data.write().await;
        let deal = data
            .deals
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(AppError::NotFound("Deal"))?;

        input.apply_to(deal)?;
        let updated = deal.clone();
        self.save(&data).await?;

        Ok(updated)
    }

    async fn delete_deal(&self, id: &str) -> Result<bool, AppError> {
        let mut data = self.data.write().await;
        let Some(index) = data.deals.iter().position(|d| d.id == id) else {
            return Ok(false);
        };

        data.deals.remove(index);
        self.save(&data).await?;

        Ok(true)
    }

    // =========================================================================
    //  DASHBOARD
    // =========================================================================

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let data = self.data.read().await;

        let deals = &data.deals;
        let won = || deals.iter().filter(|d| d.status == DealStatus::Won);

        Ok(DashboardStats {
            total_customers: data.customers.len() as i64,
            active_customers: data
                .customers
                .iter()
                .filter(|c| c.status == CustomerStatus::Active)
                .count() as i64,
            total_deals: deals.len() as i64,
            won_deals: won().count() as i64,
            total_revenue: won().map(|d| d.value).sum::<Decimal>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_data::{self, ADMIN_ID, ADMIN_PASSWORD, ADMIN_USERNAME};
    use async_graphql::ID;
    use chrono::Duration;
    use tempfile::TempDir;

    fn auth() -> AuthService {
        AuthService::new("segredo-de-teste".into(), Duration::days(7), 4)
    }

    fn db_path(dir: &TempDir) -> PathBuf {
        dir.path().join("data/db.json")
    }

    async fn empty_repo(dir: &TempDir) -> JsonRepository {
        let repo = JsonRepository::new(db_path(dir), auth());
        repo.connect().await.unwrap();
        repo
    }

    async fn seeded_repo(dir: &TempDir) -> JsonRepository {
        let repo = empty_repo(dir).await;
        repo.seed(mock_data::generate_mock_data(&auth()).await.unwrap())
            .await
            .unwrap();
        repo
    }

    fn customer_input(first_name: &str) -> CreateCustomerInput {
        CreateCustomerInput {
            first_name: first_name.into(),
            last_name: "Schulz".into(),
            email: format!("{}.schulz@example.com", first_name.to_lowercase()),
            ..Default::default()
        }
    }

    fn deal_input(customer_id: &str, value: f64, status: Option<DealStatus>) -> CreateDealInput {
        CreateDealInput {
            title: "API Integration".into(),
            description: None,
            value,
            currency: None,
            status,
            customer_id: ID(customer_id.into()),
            start_date: None,
            end_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn connect_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let repo = empty_repo(&dir).await;

        assert!(db_path(&dir).exists());
        assert!(repo.get_customers(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn connect_refuses_to_overwrite_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ isto não é json").unwrap();

        let repo = JsonRepository::new(&path, auth());
        assert!(matches!(repo.connect().await, Err(AppError::Serialization(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ isto não é json");
    }

    #[tokio::test]
    async fn create_customer_assigns_id_timestamps_and_default_status() {
        let dir = TempDir::new().unwrap();
        let repo = empty_repo(&dir).await;

        let a = repo.create_customer(customer_input("Julia")).await.unwrap();
        let b = repo.create_customer(customer_input("Laura")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(a.status, CustomerStatus::Lead);
        assert_eq!(repo.get_customer(&a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn mutations_are_persisted_across_reconnects() {
        let dir = TempDir::new().unwrap();
        let created = {
            let repo = empty_repo(&dir).await;
            repo.create_customer(customer_input("Markus")).await.unwrap()
        };

        let reopened = empty_repo(&dir).await;
        assert_eq!(reopened.get_customer(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn empty_update_only_bumps_updated_at() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo(&dir).await;

        let before = repo.get_customer("customer-002").await.unwrap().unwrap();
        let after = repo
            .update_customer("customer-002", UpdateCustomerInput::default())
            .await
            .unwrap();

        assert!(after.updated_at > before.updated_at);
        assert_eq!(Customer { updated_at: before.updated_at, ..after }, before);
    }

    #[tokio::test]
    async fn update_of_missing_records_is_not_found() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo(&dir).await;

        let customer = repo.update_customer("nope", UpdateCustomerInput::default()).await;
        assert!(matches!(customer, Err(AppError::NotFound("Customer"))));

        let deal = repo.update_deal("nope", UpdateDealInput::default()).await;
        assert!(matches!(deal, Err(AppError::NotFound("Deal"))));
    }

    #[tokio::test]
    async fn delete_customer_cascades_to_deals() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo(&dir).await;

        assert!(!repo.get_deals_by_customer("customer-001").await.unwrap().is_empty());
        assert!(repo.delete_customer("customer-001").await.unwrap());

        assert_eq!(repo.get_customer("customer-001").await.unwrap(), None);
        assert!(repo.get_deals_by_customer("customer-001").await.unwrap().is_empty());
        assert_eq!(repo.get_deal("deal-001").await.unwrap(), None);

        // Delete idempotente
        assert!(!repo.delete_customer("customer-001").await.unwrap());
    }

    #[tokio::test]
    async fn create_deal_requires_existing_customer() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo(&dir).await;

        let result = repo.create_deal(deal_input("customer-999", 500.0, None)).await;
        assert!(matches!(result, Err(AppError::NotFound("Customer"))));
        assert_eq!(repo.get_dashboard_stats().await.unwrap().total_deals, 30);

        let deal = repo.create_deal(deal_input("customer-003", 500.0, None)).await.unwrap();
        assert_eq!(deal.currency, "EUR");
        assert_eq!(deal.status, DealStatus::Lead);
        assert!(repo.get_deals_by_customer("customer-003").await.unwrap().contains(&deal));
    }

    #[tokio::test]
    async fn delete_deal_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo(&dir).await;

        assert!(repo.delete_deal("deal-010").await.unwrap());
        assert!(!repo.delete_deal("deal-010").await.unwrap());
    }

    #[tokio::test]
    async fn dashboard_revenue_is_sum_of_won_deals() {
        let dir = TempDir::new().unwrap();
        let repo = empty_repo(&dir).await;

        let customer = repo.create_customer(customer_input("Sophie")).await.unwrap();
        repo.update_customer(
            &customer.id,
            UpdateCustomerInput { status: Some(CustomerStatus::Active), ..Default::default() },
        )
        .await
        .unwrap();
        repo.create_customer(customer_input("Daniel")).await.unwrap();

        for (value, status) in [
            (1000.5, DealStatus::Won),
            (200.0, DealStatus::Lost),
            (300.25, DealStatus::Won),
            (99.0, DealStatus::InProgress),
        ] {
            repo.create_deal(deal_input(&customer.id, value, Some(status))).await.unwrap();
        }

        let stats = repo.get_dashboard_stats().await.unwrap();
        assert_eq!(stats.total_customers, 2);
        assert_eq!(stats.active_customers, 1);
        assert_eq!(stats.total_deals, 4);
        assert_eq!(stats.won_deals, 2);
        assert_eq!(stats.total_revenue, Decimal::new(130075, 2));
    }

    #[tokio::test]
    async fn pagination_returns_contiguous_slice_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let repo = empty_repo(&dir).await;

        let mut ids = Vec::new();
        for name in ["Max", "Lisa", "Anna", "Sarah", "Maria"] {
            ids.push(repo.create_customer(customer_input(name)).await.unwrap().id);
        }

        let page = repo
            .get_customers(Some(PaginationInput { limit: Some(2), offset: Some(1) }))
            .await
            .unwrap();
        let page_ids: Vec<_> = page.into_iter().map(|c| c.id).collect();
        assert_eq!(page_ids, ids[1..3]);
    }

    #[tokio::test]
    async fn login_against_seeded_admin() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo(&dir).await;

        let payload = repo
            .login(LoginInput { username: ADMIN_USERNAME.into(), password: ADMIN_PASSWORD.into() })
            .await
            .unwrap();
        assert_eq!(payload.user.id, ADMIN_ID);
        assert_eq!(auth().verify_token(&payload.token).as_deref(), Some(ADMIN_ID));

        let wrong = repo
            .login(LoginInput { username: ADMIN_USERNAME.into(), password: "wrong".into() })
            .await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = repo
            .login(LoginInput { username: "ghost".into(), password: ADMIN_PASSWORD.into() })
            .await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn password_hash_is_kept_in_the_document() {
        let dir = TempDir::new().unwrap();
        seeded_repo(&dir).await;

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(db_path(&dir)).unwrap()).unwrap();
        assert!(raw["users"][0]["passwordHash"].as_str().unwrap().starts_with("$2"));
        assert_eq!(raw["deals"][0]["customerId"], "customer-001");
    }

    #[tokio::test]
    async fn reads_documents_that_store_the_hash_as_password() {
        let dir = TempDir::new().unwrap();
        let hash = auth().hash_password(ADMIN_PASSWORD).await.unwrap();
        let legacy = serde_json::json!({
            "users": [{
                "id": ADMIN_ID,
                "username": ADMIN_USERNAME,
                "email": "admin@portfolio-crm.com",
                "password": hash,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }],
            "customers": [],
            "deals": []
        });
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(db_path(&dir), legacy.to_string()).unwrap();

        let repo = JsonRepository::new(db_path(&dir), auth());
        repo.connect().await.unwrap();

        let payload = repo
            .login(LoginInput { username: ADMIN_USERNAME.into(), password: ADMIN_PASSWORD.into() })
            .await
            .unwrap();
        assert_eq!(payload.user.id, ADMIN_ID);
    }
}
