// src/graphql/types.rs

// Campos calculados dos modelos: ids como ID, Decimal como Float e as
// relações Customer.deals / Deal.customer (uma consulta extra por objeto pai).

use async_graphql::{ComplexObject, Context, ErrorExtensions, Result, ResultExt, ID};
use rust_decimal::prelude::ToPrimitive;

use super::repo;
use crate::{
    common::error::AppError,
    models::{
        auth::User,
        crm::{Customer, Deal},
        dashboard::DashboardStats,
    },
};

#[ComplexObject]
impl User {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }
}

#[ComplexObject]
impl Customer {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn deals(&self, ctx: &Context<'_>) -> Result<Vec<Deal>> {
        repo(ctx)?.get_deals_by_customer(&self.id).await.extend()
    }
}

#[ComplexObject]
impl Deal {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn value(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }

    async fn customer_id(&self) -> ID {
        ID(self.customer_id.clone())
    }

    async fn customer(&self, ctx: &Context<'_>) -> Result<Customer> {
        repo(ctx)?
            .get_customer(&self.customer_id)
            .await
            .extend()?
            .ok_or_else(|| AppError::NotFound("Customer").extend())
    }
}

#[ComplexObject]
impl DashboardStats {
    async fn total_revenue(&self) -> f64 {
        self.total_revenue.to_f64().unwrap_or_default()
    }
}
