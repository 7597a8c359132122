// src/middleware/auth.rs

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::config::AppState;

/// Quem está fazendo a requisição. `user_id` é `None` quando não há token,
/// ou quando ele é inválido/expirado: a requisição continua, só que anônima.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub user_id: Option<String>,
}

// Extrator: lê o Authorization e resolve o id do usuário. Nunca rejeita.
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let user_id = state.auth_service.user_id_from_header(auth_header);
        if auth_header.is_some() && user_id.is_none() {
            tracing::debug!("Cabeçalho Authorization presente, mas token inválido.");
        }

        Ok(AuthContext { user_id })
    }
}
