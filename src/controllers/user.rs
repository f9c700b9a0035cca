use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, Response, header};
use axum::middleware::Next;
use chrono::Utc;

use crate::core::error::{self, Error, StoreError};
use crate::core::state::AppState;
use crate::core::store::{CredentialStore, bounded};
use crate::token::TokenAuthority;
use crate::types::{AuthenticatedUser, Identity, UserId};
use crate::utils::validation::CredentialRules;

pub(crate) const TOKEN_HEADER: HeaderName = HeaderName::from_static("token");

#[derive(Clone)]
pub(crate) struct UserController<S> {
    store: S,
    authority: TokenAuthority,
    rules: CredentialRules,
    bcrypt_cost: u32,
    deadline: Duration,
}

impl<S> std::fmt::Debug for UserController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserController")
            .field("authority", &self.authority)
            .field("rules", &self.rules)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl<S: CredentialStore> UserController<S> {
    pub(crate) fn new(
        store: S,
        secret: &str,
        bcrypt_cost: u32,
        deadline: Duration,
    ) -> Result<Self, error::ConfigError> {
        Ok(Self {
            store,
            authority: TokenAuthority::new(secret),
            rules: CredentialRules::new()?,
            bcrypt_cost,
            deadline,
        })
    }

    pub(crate) async fn register(&self, name: &str, password: &str) -> Result<Identity, Error> {
        self.rules.check(name, password)?;

        let password_hash = self.hash(password).await?;

        match bounded(self.deadline, self.store.create(name, &password_hash)).await {
            Ok(identity) => Ok(identity),
            Err(StoreError::Conflict) => Err(Error::UserAlreadyExists),
            Err(e) => Err(Error::Store(e)),
        }
    }

    /// Verifies the password against the stored hash and issues a token.
    pub(crate) async fn login(&self, name: &str, password: &str) -> Result<String, Error> {
        self.rules.check(name, password)?;

        let user = bounded(self.deadline, self.store.lookup(name))
            .await?
            .ok_or(Error::UserNotFound)?;

        let (password, hash) = (password.to_owned(), user.password_hash.clone());
        let verified =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        if let false = verified {
            return Err(Error::InvalidCredentials);
        };

        self.authority.issue(&user, Utc::now())
    }

    pub(crate) fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        self.authority.validate(token, Utc::now())
    }

    /// Hashing blocks for the whole cost, so it runs off the async workers.
    async fn hash(&self, value: &str) -> Result<String, Error> {
        let (value, cost) = (value.to_owned(), self.bcrypt_cost);
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(value, cost)).await??)
    }
}

/// Pulls the bearer token from `Authorization: Bearer <token>`, falling back to
/// the `token` header when `Authorization` is absent or blank. Absent headers
/// read as an empty token.
pub(crate) fn extract_token(headers: &HeaderMap) -> Result<&str, Error> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| Error::MalformedToken))
        .transpose()?
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(value) = authorization {
        let mut parts = value.split_whitespace();
        return match (parts.next(), parts.next()) {
            (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
            (Some(scheme), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(""),
            _ => Err(Error::MalformedToken),
        };
    }

    match headers.get(TOKEN_HEADER) {
        Some(value) => value.to_str().map(str::trim).map_err(|_| Error::MalformedToken),
        None => Ok(""),
    }
}

pub(crate) async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let token = extract_token(request.headers())?;

    let user_id = state.user_controller.authenticate(token)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { id: user_id });

    Ok(next.run(request).await)
}
