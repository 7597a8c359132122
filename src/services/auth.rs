// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{AuthPayload, Claims, User},
};

/// Extrai o token de um cabeçalho `Authorization: Bearer <token>`.
/// Qualquer outro formato devolve `None` (não é erro).
pub fn extract_token(auth_header: Option<&str>) -> Option<&str> {
    let mut parts = auth_header?.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

// Sem estado além do segredo: cada chamada depende só das entradas.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    jwt_expiration: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(jwt_secret: String, jwt_expiration: Duration, bcrypt_cost: u32) -> Self {
        Self { jwt_secret, jwt_expiration, bcrypt_cost }
    }

    /// Valida a senha contra o usuário encontrado (se houver) e emite o token.
    /// Usuário inexistente e senha errada dão o mesmo erro.
    pub async fn authenticate(&self, user: Option<User>, password: &str) -> Result<AuthPayload, AppError> {
        let user = user.ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok(AuthPayload { token, user })
    }

    /// Devolve o id do usuário se o token for válido (assinatura e expiração).
    /// Token inválido ou expirado vira `None`: a requisição segue como anônima.
    pub fn verify_token(&self, token: &str) -> Option<String> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims.user_id)
        .map_err(|e| tracing::debug!("Token rejeitado: {}", e))
        .ok()
    }

    /// Atalho usado pelo handler HTTP: cabeçalho -> token -> id do usuário.
    pub fn user_id_from_header(&self, auth_header: Option<&str>) -> Option<String> {
        extract_token(auth_header).and_then(|token| self.verify_token(token))
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.jwt_expiration;

        let claims = Claims {
            user_id: user.id.clone(),
            username: user.username.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;

        // Executa o hashing em um thread separado
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password_clone = password.to_owned();
        let password_hash_clone = password_hash.to_owned();

        // Executa a verificação em um thread separado
        let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        Ok(is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time;

    fn service(secret: &str) -> AuthService {
        AuthService::new(secret.to_string(), Duration::days(7), 4)
    }

    async fn user_with_password(auth: &AuthService, password: &str) -> User {
        let now = time::now();
        User {
            id: "user-admin-001".into(),
            username: "admin".into(),
            email: "admin@portfolio-crm.com".into(),
            password_hash: auth.hash_password(password).await.unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn extracts_only_well_formed_bearer_headers() {
        assert_eq!(extract_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_token(None), None);
        assert_eq!(extract_token(Some("abc.def.ghi")), None);
        assert_eq!(extract_token(Some("Basic abc")), None);
        assert_eq!(extract_token(Some("bearer abc")), None);
        assert_eq!(extract_token(Some("Bearer a b")), None);
        assert_eq!(extract_token(Some("Bearer ")), None);
    }

    #[tokio::test]
    async fn issued_token_resolves_to_user_id() {
        let auth = service("segredo");
        let user = user_with_password(&auth, "admin").await;
        let token = auth.create_token(&user).unwrap();

        assert_eq!(auth.verify_token(&token).as_deref(), Some("user-admin-001"));
        assert_eq!(
            auth.user_id_from_header(Some(&format!("Bearer {token}"))).as_deref(),
            Some("user-admin-001")
        );
    }

    #[tokio::test]
    async fn token_from_another_secret_is_rejected() {
        let user = user_with_password(&service("a"), "admin").await;
        let token = service("a").create_token(&user).unwrap();
        assert_eq!(service("b").verify_token(&token), None);
        assert_eq!(service("b").verify_token("lixo"), None);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = AuthService::new("segredo".into(), Duration::hours(-2), 4);
        let user = user_with_password(&auth, "admin").await;
        let token = auth.create_token(&user).unwrap();
        assert_eq!(auth.verify_token(&token), None);
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let auth = service("segredo");
        let user = user_with_password(&auth, "admin").await;

        let payload = auth.authenticate(Some(user.clone()), "admin").await.unwrap();
        assert_eq!(payload.user.id, "user-admin-001");
        assert_eq!(auth.verify_token(&payload.token).as_deref(), Some("user-admin-001"));

        let wrong = auth.authenticate(Some(user), "wrong").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let missing = auth.authenticate(None, "admin").await;
        assert!(matches!(missing, Err(AppError::InvalidCredentials)));
    }
}
