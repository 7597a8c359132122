//src/main.rs

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod graphql;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::{
    config::{AppConfig, AppState},
    services::mock_data,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger antes de tudo (a config já loga avisos)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;

    match std::env::args().nth(1).as_deref() {
        None | Some("serve") => serve(config).await,
        Some("seed") => seed(config).await,
        Some(other) => anyhow::bail!("Comando desconhecido '{other}'. Use 'serve' ou 'seed'."),
    }
}

fn router(app_state: AppState) -> Router {
    let origins: Vec<HeaderValue> = app_state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/graphql",
            get(handlers::graphql::graphiql).post(handlers::graphql::graphql_handler),
        )
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        "🗄️  Backend: {}",
        if config.database_url.is_some() { "PostgreSQL" } else { "JSON" }
    );

    let app_state = AppState::new(config).await?;
    let app = router(app_state.clone());

    // Inicia o servidor
    let addr = (app_state.config.host.as_str(), app_state.config.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Servidor GraphQL em http://{}/graphql", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Grava o arquivo / fecha o pool
    app_state.repo.disconnect().await?;
    tracing::info!("👋 Servidor encerrado.");
    Ok(())
}

async fn seed(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("🌱 Gerando dados fictícios...");

    let auth_service = config.auth_service();
    let repo = db::connect_repository(&config, auth_service.clone()).await?;
    let data = mock_data::generate_mock_data(&auth_service).await?;

    let (users, customers, deals) = (data.users.len(), data.customers.len(), data.deals.len());
    repo.seed(data).await?;
    repo.disconnect().await?;

    tracing::info!(
        "✅ Dados gravados no backend '{}': {} usuários, {} clientes, {} deals",
        repo.backend(),
        users,
        customers,
        deals
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao escutar o sinal de encerramento: {}", e);
    }
}
