//! services/api/src/web/mod.rs
//!
//! The HTTP surface: shared state, session tokens, the authorization
//! middleware, the REST handlers, and the router wiring them together.

pub mod middleware;
pub mod rest;
pub mod session;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::state::AppState;

// Re-export the pieces the binary needs to build the server.
pub use rest::ApiDoc;
pub use session::SessionTokens;

/// Total request body ceiling; bounds an upload of three images.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the full application router over the given state.
///
/// The same router serves the binary and the integration tests. Layer order
/// matters: the API key check wraps everything (it must run first), the CSRF
/// check wraps only the state-changing routes.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(middleware::API_KEY_HEADER),
            HeaderName::from_static(middleware::CSRF_TOKEN_HEADER),
        ]);

    // Routes that mutate the store sit behind the CSRF layer.
    let mutating_routes = Router::new()
        .route("/cat/rating", post(rest::submit_rating_handler))
        .route("/cats/upload", post(rest::upload_cats_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_csrf,
        ));

    let api_router = Router::new()
        .route("/csrf-token", get(rest::csrf_token_handler))
        .route("/cats/top-rated", get(rest::top_rated_handler))
        .route("/cats/rate", get(rest::cat_to_rate_handler))
        .merge(mutating_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state.clone());

    // Uploaded images are served statically, outside the API key gate, the
    // same way the docs are.
    Router::new()
        .merge(api_router)
        .nest_service("/cat/image", ServeDir::new(state.config.images_dir()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
