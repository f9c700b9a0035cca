use crate::controllers::user::{TOKEN_HEADER, authenticate};
use crate::core::error;
use crate::core::state::AppState;
use crate::routes::{auth, health, terminals};
use axum::error_handling::HandleErrorLayer;
use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::Method,
    middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;

pub(crate) fn routes(state: AppState) -> Router {
    // /user/...
    let user_router = Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in));

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/terminals",
            get(terminals::favorites)
                .post(terminals::favorites)
                .layer(middleware::from_fn_with_state(state.clone(), authenticate)),
        )
        .nest("/user", user_router)
        .with_state(state)
        .route_layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(HandleErrorLayer::new(error::handle_middleware_errors))
                .buffer(128)
                .rate_limit(50, Duration::from_secs(1))
                .layer(
                    CorsLayer::new()
                        .allow_methods([Method::GET, Method::POST])
                        .allow_origin(cors::Any)
                        .expose_headers([TOKEN_HEADER]),
                ),
        )
}
