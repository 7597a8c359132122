// src/handlers/graphql.rs

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::{config::AppState, middleware::auth::AuthContext};

// POST /graphql
pub async fn graphql_handler(
    State(app_state): State<AppState>,
    auth: AuthContext,
    req: GraphQLRequest,
) -> GraphQLResponse {
    // O id do usuário (se houver) vai junto para os resolvers
    app_state
        .schema
        .execute(req.into_inner().data(auth))
        .await
        .into()
}

// GET /graphql
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
