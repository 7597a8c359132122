// src/graphql.rs

// API GraphQL do CRM: QueryRoot (leituras) e MutationRoot (login e CRUD).
// Os resolvers não guardam estado; cada operação vira uma chamada ao
// CrmRepository ativo, que fica nos `data` do schema.

mod mutation;
mod query;
mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Schema};

use crate::{db::CrmRepository, middleware::auth::AuthContext};

pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(repo: Arc<dyn CrmRepository>) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(repo)
        .finish()
}

pub(crate) fn repo<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<dyn CrmRepository>> {
    ctx.data::<Arc<dyn CrmRepository>>()
}

// Requisição sem AuthContext (ex.: executada direto no schema) = anônima
pub(crate) fn current_user_id(ctx: &Context<'_>) -> Option<String> {
    ctx.data_opt::<AuthContext>()
        .and_then(|auth| auth.user_id.clone())
}
