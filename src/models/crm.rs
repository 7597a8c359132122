// src/models/crm.rs

use async_graphql::{Enum, InputObject, MaybeUndefined, SimpleObject};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::common::{error::AppError, time};

// --- ENUMS ---

// Mapeia o CREATE TYPE customer_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Enum)]
#[sqlx(type_name = "customer_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Lead,
}

// Mapeia o CREATE TYPE deal_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Enum)]
#[sqlx(type_name = "deal_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStatus {
    Lead,
    InProgress,
    Won,
    Lost,
}

pub const DEFAULT_CURRENCY: &str = "EUR";

// --- CLIENTE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(complex)]
pub struct Customer {
    #[graphql(skip)]
    pub id: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: CustomerStatus,
    pub address: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- NEGÓCIO (Deal) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(complex)]
pub struct Deal {
    #[graphql(skip)]
    pub id: String,

    pub title: String,
    pub description: Option<String>,

    // Guardado como Decimal, exposto como Float no GraphQL
    #[graphql(skip)]
    pub value: Decimal,
    pub currency: String,
    pub status: DealStatus,

    #[graphql(skip)]
    pub customer_id: String,

    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
//  INPUTS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct PaginationInput {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl PaginationInput {
    pub const DEFAULT_LIMIT: i64 = 20;

    // Valores negativos viram zero
    pub fn limit(&self) -> i64 {
        self.limit.map_or(Self::DEFAULT_LIMIT, |l| i64::from(l.max(0)))
    }

    pub fn offset(&self) -> i64 {
        self.offset.map_or(0, |o| i64::from(o.max(0)))
    }

    /// Aplica a paginação numa coleção em memória, na ordem em que ela está.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.offset() as usize).min(items.len());
        let end = start.saturating_add(self.limit() as usize).min(items.len());
        &items[start..end]
    }
}

#[derive(Debug, Clone, Default, InputObject, Validate)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, message = "required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "required"))]
    pub last_name: String,
    // Formato do email fica a cargo do cliente
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<CustomerStatus>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl CreateCustomerInput {
    /// Monta o registro completo: status padrão LEAD, `created_at == updated_at`.
    pub fn into_customer(self, id: String) -> Customer {
        let now = time::now();
        Customer {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            status: self.status.unwrap_or(CustomerStatus::Lead),
            address: self.address,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

// Campo ausente = mantém o valor atual. Nos campos opcionais, null limpa.
#[derive(Debug, Clone, Default, InputObject, Validate)]
pub struct UpdateCustomerInput {
    #[validate(length(min = 1, message = "required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: MaybeUndefined<String>,
    pub company: MaybeUndefined<String>,
    pub status: Option<CustomerStatus>,
    pub address: MaybeUndefined<String>,
    pub notes: MaybeUndefined<String>,
}

impl UpdateCustomerInput {
    pub fn apply_to(self, customer: &mut Customer) {
        merge(&mut customer.first_name, self.first_name);
        merge(&mut customer.last_name, self.last_name);
        merge(&mut customer.email, self.email);
        merge_optional(&mut customer.phone, self.phone);
        merge_optional(&mut customer.company, self.company);
        merge(&mut customer.status, self.status);
        merge_optional(&mut customer.address, self.address);
        merge_optional(&mut customer.notes, self.notes);
        customer.updated_at = time::bumped(customer.updated_at);
    }
}

#[derive(Debug, Clone, InputObject, Validate)]
pub struct CreateDealInput {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must_be_non_negative"))]
    pub value: f64,
    #[validate(length(equal = 3, message = "invalid_currency"))]
    pub currency: Option<String>,
    pub status: Option<DealStatus>,
    pub customer_id: async_graphql::ID,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl CreateDealInput {
    /// Monta o registro completo: moeda padrão EUR, status padrão LEAD,
    /// `start_date` padrão = agora.
    pub fn into_deal(self, id: String) -> Result<Deal, AppError> {
        let now = time::now();
        Ok(Deal {
            id,
            title: self.title,
            description: self.description,
            value: to_amount(self.value)?,
            currency: self.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: self.status.unwrap_or(DealStatus::Lead),
            customer_id: self.customer_id.0,
            start_date: self.start_date.unwrap_or(now),
            end_date: self.end_date,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, InputObject, Validate)]
pub struct UpdateDealInput {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    pub description: MaybeUndefined<String>,
    #[validate(range(min = 0.0, message = "must_be_non_negative"))]
    pub value: Option<f64>,
    #[validate(length(equal = 3, message = "invalid_currency"))]
    pub currency: Option<String>,
    pub status: Option<DealStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: MaybeUndefined<DateTime<Utc>>,
    pub notes: MaybeUndefined<String>,
}

impl UpdateDealInput {
    pub fn apply_to(self, deal: &mut Deal) -> Result<(), AppError> {
        if let Some(value) = self.value {
            deal.value = to_amount(value)?;
        }
        merge(&mut deal.title, self.title);
        merge_optional(&mut deal.description, self.description);
        merge(&mut deal.currency, self.currency);
        merge(&mut deal.status, self.status);
        merge(&mut deal.start_date, self.start_date);
        merge_optional(&mut deal.end_date, self.end_date);
        merge_optional(&mut deal.notes, self.notes);
        deal.updated_at = time::bumped(deal.updated_at);
        Ok(())
    }
}

fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn merge_optional<T>(target: &mut Option<T>, value: MaybeUndefined<T>) {
    match value {
        MaybeUndefined::Undefined => {}
        MaybeUndefined::Null => *target = None,
        MaybeUndefined::Value(value) => *target = Some(value),
    }
}

// Maior valor que cabe em NUMERIC(14,2): os dois backends aceitam a mesma faixa
pub const MAX_DEAL_VALUE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

// Converte o Float do GraphQL num valor monetário com 2 casas (NUMERIC(14,2))
fn to_amount(value: f64) -> Result<Decimal, AppError> {
    Decimal::try_from(value)
        .ok()
        .map(|amount| amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .filter(|amount| *amount >= Decimal::ZERO && *amount <= MAX_DEAL_VALUE)
        .ok_or_else(|| {
            let mut errors = validator::ValidationErrors::new();
            let mut error = validator::ValidationError::new("invalid_amount");
            error.message = Some("out_of_range".into());
            errors.add("value", error);
            AppError::ValidationError(errors)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_customer() -> Customer {
        CreateCustomerInput {
            first_name: "Anna".into(),
            last_name: "Fischer".into(),
            email: "anna.fischer@example.com".into(),
            company: Some("Software Experts".into()),
            ..Default::default()
        }
        .into_customer("customer-x".into())
    }

    #[test]
    fn new_customer_defaults_to_lead_with_equal_timestamps() {
        let customer = sample_customer();
        assert_eq!(customer.status, CustomerStatus::Lead);
        assert_eq!(customer.created_at, customer.updated_at);
    }

    #[test]
    fn empty_update_only_bumps_updated_at() {
        let original = sample_customer();
        let mut updated = original.clone();
        UpdateCustomerInput::default().apply_to(&mut updated);

        assert!(updated.updated_at > original.updated_at);
        updated.updated_at = original.updated_at;
        assert_eq!(updated, original);
    }

    #[test]
    fn update_merges_only_provided_fields() {
        let mut customer = sample_customer();
        UpdateCustomerInput {
            status: Some(CustomerStatus::Active),
            phone: MaybeUndefined::Value("+49 151 1234567".into()),
            ..Default::default()
        }
        .apply_to(&mut customer);

        assert_eq!(customer.status, CustomerStatus::Active);
        assert_eq!(customer.phone.as_deref(), Some("+49 151 1234567"));
        assert_eq!(customer.company.as_deref(), Some("Software Experts"));
        assert_eq!(customer.first_name, "Anna");
    }

    #[test]
    fn explicit_null_clears_optional_fields() {
        let mut customer = sample_customer();
        customer.phone = Some("+49 350 8489602".into());
        UpdateCustomerInput {
            phone: MaybeUndefined::Null,
            company: MaybeUndefined::Null,
            ..Default::default()
        }
        .apply_to(&mut customer);

        assert_eq!(customer.phone, None);
        assert_eq!(customer.company, None);
        assert_eq!(customer.email, "anna.fischer@example.com");
    }

    #[test]
    fn new_deal_defaults_currency_status_and_start_date() {
        let deal = CreateDealInput {
            title: "Cloud Migration".into(),
            description: None,
            value: 1234.567,
            currency: None,
            status: None,
            customer_id: async_graphql::ID("customer-001".into()),
            start_date: None,
            end_date: None,
            notes: None,
        }
        .into_deal("deal-x".into())
        .unwrap();

        assert_eq!(deal.currency, "EUR");
        assert_eq!(deal.status, DealStatus::Lead);
        assert_eq!(deal.start_date, deal.created_at);
        assert_eq!(deal.value, Decimal::new(123457, 2));
    }

    #[test]
    fn deal_update_rejects_non_finite_values() {
        let mut deal = CreateDealInput {
            title: "SEO Optimization".into(),
            description: None,
            value: 10.0,
            currency: Some("USD".into()),
            status: Some(DealStatus::Won),
            customer_id: async_graphql::ID("customer-001".into()),
            start_date: Some(Utc::now() - Duration::days(3)),
            end_date: None,
            notes: None,
        }
        .into_deal("deal-y".into())
        .unwrap();

        let result = UpdateDealInput {
            value: Some(f64::NAN),
            ..Default::default()
        }
        .apply_to(&mut deal);

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(deal.value, Decimal::new(10, 0));

        UpdateDealInput {
            end_date: MaybeUndefined::Value(Utc::now()),
            notes: MaybeUndefined::Value("Fechado".into()),
            ..Default::default()
        }
        .apply_to(&mut deal)
        .unwrap();
        assert!(deal.end_date.is_some());

        UpdateDealInput {
            end_date: MaybeUndefined::Null,
            ..Default::default()
        }
        .apply_to(&mut deal)
        .unwrap();
        assert_eq!(deal.end_date, None);
        assert_eq!(deal.notes.as_deref(), Some("Fechado"));
    }

    #[test]
    fn amounts_must_fit_the_money_column() {
        assert_eq!(to_amount(999_999_999_999.99).unwrap(), MAX_DEAL_VALUE);
        assert_eq!(MAX_DEAL_VALUE.to_string(), "999999999999.99");
        assert_eq!(to_amount(0.0).unwrap(), Decimal::ZERO);

        assert!(matches!(to_amount(1e12), Err(AppError::ValidationError(_))));
        assert!(matches!(to_amount(1e13), Err(AppError::ValidationError(_))));
        assert!(matches!(to_amount(-0.5), Err(AppError::ValidationError(_))));
        assert!(matches!(to_amount(f64::INFINITY), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn pagination_slices_in_store_order() {
        let items = [0, 1, 2, 3, 4];
        let page = PaginationInput { limit: Some(2), offset: Some(1) };
        assert_eq!(page.slice(&items), &[1, 2]);

        let past_end = PaginationInput { limit: None, offset: Some(10) };
        assert!(past_end.slice(&items).is_empty());

        assert_eq!(PaginationInput::default().slice(&items).len(), 5);
    }

    #[test]
    fn invalid_inputs_fail_validation() {
        let input = CreateCustomerInput {
            first_name: String::new(),
            last_name: "Weber".into(),
            email: "not-an-email".into(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
        // Email não é validado no servidor
        assert!(!errors.field_errors().contains_key("email"));
    }
}
