use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue};
use tracing::instrument;

use crate::controllers::user::TOKEN_HEADER;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::extract::JsonBody;
use crate::types::request::Credentials;
use crate::types::response::Message;

#[instrument(skip(state))]
pub(crate) async fn sign_up(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<Message>, Error> {
    let identity = state
        .user_controller
        .register(&credentials.name, &credentials.password)
        .await?;

    tracing::info!(user_id = identity.id, "user created");

    Ok(Json(Message::new("user created")))
}

/// The token travels in the `token` response header only.
#[instrument(skip(state))]
pub(crate) async fn sign_in(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<(HeaderMap, Json<Message>), Error> {
    let token = state
        .user_controller
        .login(&credentials.name, &credentials.password)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(TOKEN_HEADER, HeaderValue::from_str(&token)?);

    Ok((headers, Json(Message::new("access token in header"))))
}
