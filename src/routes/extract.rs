use axum_macros::FromRequest;

use crate::core::error::Error;

/// `Json` whose rejections answer with the structured error payload.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub(crate) struct JsonBody<T>(pub(crate) T);
