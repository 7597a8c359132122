// src/graphql/mutation.rs

use async_graphql::{Context, Object, Result, ResultExt, ID};

use super::repo;
use crate::models::{
    auth::{AuthPayload, LoginInput},
    crm::{CreateCustomerInput, CreateDealInput, Customer, Deal, UpdateCustomerInput, UpdateDealInput},
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        repo(ctx)?.login(input).await.extend()
    }

    // --- Clientes ---

    async fn create_customer(&self, ctx: &Context<'_>, input: CreateCustomerInput) -> Result<Customer> {
        repo(ctx)?.create_customer(input).await.extend()
    }

    async fn update_customer(&self, ctx: &Context<'_>, id: ID, input: UpdateCustomerInput) -> Result<Customer> {
        repo(ctx)?.update_customer(&id, input).await.extend()
    }

    /// Remove o cliente e os deals dele. `false` se o id não existia.
    async fn delete_customer(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        repo(ctx)?.delete_customer(&id).await.extend()
    }

    // --- Deals ---

    async fn create_deal(&self, ctx: &Context<'_>, input: CreateDealInput) -> Result<Deal> {
        repo(ctx)?.create_deal(input).await.extend()
    }

    async fn update_deal(&self, ctx: &Context<'_>, id: ID, input: UpdateDealInput) -> Result<Deal> {
        repo(ctx)?.update_deal(&id, input).await.extend()
    }

    async fn delete_deal(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        repo(ctx)?.delete_deal(&id).await.extend()
    }
}
