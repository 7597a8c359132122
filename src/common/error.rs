// src/common/error.rs

use async_graphql::ErrorExtensions;
use thiserror::Error;

// Nosso tipo de erro único. Os dois repositórios (JSON e Postgres) devolvem
// exatamente as mesmas variantes, então o resolver nunca sabe qual está ativo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Não autenticado")]
    NotAuthenticated,

    // O &'static str é o nome da entidade ("Customer", "Deal")
    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de migração: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável exposto em `extensions.code` da resposta GraphQL.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "BAD_USER_INPUT",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotAuthenticated => "UNAUTHENTICATED",
            AppError::NotFound(_) => "NOT_FOUND",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    fn is_internal(&self) -> bool {
        self.code() == "INTERNAL_SERVER_ERROR"
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();

        let message = if self.is_internal() {
            // O `tracing` loga a mensagem detalhada; o cliente só vê a genérica.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
            "Ocorreu um erro inesperado.".to_string()
        } else {
            self.to_string()
        };

        let mut error = async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code));

        // Retorna todos os detalhes da validação, campo a campo.
        if let AppError::ValidationError(errors) = self {
            let fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect();
            error = error.extend_with(|_, e| e.set("fields", fields));
        }

        error
    }
}
