use axum::extract::State;

use crate::core::error::{Error, StoreError};
use crate::core::state::AppState;

pub(crate) async fn health(State(state): State<AppState>) -> Result<&'static str, Error> {
    sqlx::query("SELECT 1")
        .execute(&state.store.pool)
        .await
        .map_err(StoreError::Sql)?;

    Ok("ok")
}
