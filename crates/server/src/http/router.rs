use super::handlers::{admin, comments};
use super::middleware::{require_admin, require_post, require_posting, verify_csrf};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins == "*" {
        return CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        tracing::info!("CORS enabled for origins: {:?}", origins);
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(origins)
            .allow_headers(Any)
    }
}

/// The permission check is the outer layer, so a caller without the right
/// permission never gets as far as token validation.
pub fn build_router(state: AppState, allowed_origins: &str, static_dir: &Path) -> Router {
    let admin_actions = Router::new()
        .route("/settings", post(admin::update_settings))
        .route("/delete/:id", post(admin::delete_comment))
        .route("/approve/:id", post(admin::approve_comment))
        .route_layer(from_fn_with_state(state.clone(), verify_csrf))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let admin_views = Router::new()
        .route("/", get(admin::admin_page))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let posting = Router::new()
        .route("/new-comment", post(comments::new_comment))
        .route_layer(from_fn_with_state(state.clone(), verify_csrf))
        .route_layer(from_fn_with_state(state.clone(), require_posting));

    let sign_in = Router::new()
        .route("/comment-sign-in", get(comments::comment_sign_in))
        .route_layer(from_fn_with_state(state.clone(), require_post));

    Router::new()
        .route("/comments", get(comments::show_comments))
        .merge(admin_actions)
        .merge(admin_views)
        .merge(posting)
        .merge(sign_in)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
