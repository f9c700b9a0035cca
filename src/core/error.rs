use axum::BoxError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database migration error: {0}")]
    DatabaseMigration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Failures reported by the backing stores.
#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Store operation timed out")]
    Timeout,
    #[error("Unique constraint violated")]
    Conflict,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ValidationError {
    #[error("Name must be at least 6 and password at least 5 characters")]
    Length,
    #[error("Name and password may only contain letters, digits and underscores")]
    Charset,
    #[error("Name and password cannot begin or end with an underscore")]
    UnderscorePosition,
    #[error("Name and password may contain at most 2 underscores")]
    TooManyUnderscores,
}

impl ValidationError {
    fn code(self) -> &'static str {
        match self {
            ValidationError::Length => "invalid_length",
            ValidationError::Charset => "invalid_characters",
            ValidationError::UnderscorePosition => "invalid_underscore",
            ValidationError::TooManyUnderscores => "too_many_underscores",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    Validation,
    Auth,
    NotFound,
    Conflict,
    Store,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Store => "store",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Invalid credentials: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid request body: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
    #[error("Empty token")]
    EmptyToken,
    #[error("Malformed token")]
    MalformedToken,
    #[error("Invalid signing method")]
    InvalidSigningMethod,
    #[error("Signature is invalid")]
    InvalidSignature,
    #[error("Invalid claims")]
    InvalidClaims,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Terminal {0} does not exist")]
    UnknownTerminal(i64),
    #[error("Terminal {0} is already favorited")]
    AlreadyFavorited(i64),
    #[error("Terminal {0} is not favorited")]
    NotFavorited(i64),
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[source] StoreError),
    #[error("Favorites mutation failed: {0}")]
    MutationFailed(#[source] StoreError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
    #[error("Invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl Error {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidBody(_) => ErrorKind::Validation,
            Error::EmptyToken
            | Error::MalformedToken
            | Error::InvalidSigningMethod
            | Error::InvalidSignature
            | Error::InvalidClaims
            | Error::TokenExpired
            | Error::InvalidCredentials => ErrorKind::Auth,
            Error::UserNotFound | Error::UnknownTerminal(_) | Error::NotFavorited(_) => {
                ErrorKind::NotFound
            }
            Error::AlreadyFavorited(_) | Error::UserAlreadyExists => ErrorKind::Conflict,
            Error::CatalogUnavailable(_)
            | Error::MutationFailed(_)
            | Error::Store(_)
            | Error::Jwt(_)
            | Error::Bcrypt(_)
            | Error::Blocking(_)
            | Error::Header(_) => ErrorKind::Store,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Error::Validation(e) => e.code(),
            Error::InvalidBody(_) => "invalid_body",
            Error::EmptyToken => "empty_token",
            Error::MalformedToken => "malformed_token",
            Error::InvalidSigningMethod => "invalid_signing_method",
            Error::InvalidSignature => "invalid_signature",
            Error::InvalidClaims => "invalid_claims",
            Error::TokenExpired => "token_expired",
            Error::InvalidCredentials => "invalid_credentials",
            Error::UserNotFound => "user_not_found",
            Error::UnknownTerminal(_) => "unknown_terminal",
            Error::AlreadyFavorited(_) => "already_favorited",
            Error::NotFavorited(_) => "not_favorited",
            Error::UserAlreadyExists => "user_already_exists",
            Error::CatalogUnavailable(_) => "catalog_unavailable",
            Error::MutationFailed(_) => "mutation_failed",
            Error::Store(_) => "store_unavailable",
            Error::Jwt(_) => "token_encoding_failed",
            Error::Bcrypt(_) => "password_hash_failed",
            Error::Blocking(_) => "internal",
            Error::Header(_) => "invalid_header",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::CatalogUnavailable(StoreError::Timeout)
            | Error::MutationFailed(StoreError::Timeout)
            | Error::Store(StoreError::Timeout) => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidBody(rejection) => rejection.status(),
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Auth => StatusCode::UNAUTHORIZED,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("{:?}", self);

        let status = self.status();
        // Store internals stay in the logs.
        let message = match self.kind() {
            ErrorKind::Store => "Internal server error".to_owned(),
            _ => self.to_string(),
        };

        let body = json!({
            "kind": self.kind().as_str(),
            "error": self.code(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

pub(crate) async fn handle_middleware_errors(err: BoxError) -> Response {
    tracing::error!("Unhandled error: {:?}", err);

    let body = json!({
        "kind": ErrorKind::Store.as_str(),
        "error": "internal",
        "message": "Internal server error",
    });

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
