// src/graphql/query.rs

use async_graphql::{Context, ErrorExtensions, Object, Result, ResultExt, ID};

use super::{current_user_id, repo};
use crate::{
    common::error::AppError,
    models::{
        auth::User,
        crm::{Customer, Deal, PaginationInput},
        dashboard::DashboardStats,
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Usuário dono do token enviado no cabeçalho Authorization
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let user_id = current_user_id(ctx).ok_or_else(|| AppError::NotAuthenticated.extend())?;
        repo(ctx)?.get_user(&user_id).await.extend()
    }

    async fn customers(&self, ctx: &Context<'_>, pagination: Option<PaginationInput>) -> Result<Vec<Customer>> {
        repo(ctx)?.get_customers(pagination).await.extend()
    }

    async fn customer(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Customer>> {
        repo(ctx)?.get_customer(&id).await.extend()
    }

    async fn deals(&self, ctx: &Context<'_>, pagination: Option<PaginationInput>) -> Result<Vec<Deal>> {
        repo(ctx)?.get_deals(pagination).await.extend()
    }

    async fn deal(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Deal>> {
        repo(ctx)?.get_deal(&id).await.extend()
    }

    /// Todos os deals do cliente, sem paginação
    async fn deals_by_customer(&self, ctx: &Context<'_>, customer_id: ID) -> Result<Vec<Deal>> {
        repo(ctx)?.get_deals_by_customer(&customer_id).await.extend()
    }

    async fn dashboard_stats(&self, ctx: &Context<'_>) -> Result<DashboardStats> {
        repo(ctx)?.get_dashboard_stats().await.extend()
    }
}
