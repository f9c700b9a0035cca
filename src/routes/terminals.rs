use axum::extract::{Extension, Json, State};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::extract::JsonBody;
use crate::types::AnnotatedTerminal;
use crate::types::AuthenticatedUser;
use crate::types::request::FavoritesRequest;

#[instrument(skip(state))]
pub(crate) async fn favorites(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(params): JsonBody<FavoritesRequest>,
) -> Result<Json<Vec<AnnotatedTerminal>>, Error> {
    let terminals = state.terminal_controller.apply(user.id, params).await?;

    Ok(Json(terminals))
}
