use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use domain::Permission;
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

const MAX_FORM_BYTES: usize = 64 * 1024;

const POSTING: [Permission; 3] = [
    Permission::Post,
    Permission::PostModerated,
    Permission::PostUnmoderated,
];

fn authorize(state: &AppState, req: &Request, permissions: &[Permission]) -> Result<(), AppError> {
    if state
        .authorizer
        .capabilities(req.headers())
        .allows_any(permissions)
    {
        Ok(())
    } else {
        warn!("Permission denied for {} {}", req.method(), req.uri().path());
        Err(AppError::Forbidden)
    }
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, &req, &[Permission::Admin])?;
    Ok(next.run(req).await)
}

pub async fn require_post(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, &req, &[Permission::Post])?;
    Ok(next.run(req).await)
}

/// Any of the posting permissions will do; which one decides the
/// moderation state later on.
pub async fn require_posting(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, &req, &POSTING)?;
    Ok(next.run(req).await)
}

#[derive(Deserialize, Default)]
struct CsrfField {
    #[serde(default)]
    csrf: String,
}

/// Rejects form posts whose `csrf` field was not issued for this exact
/// path and caller. The body is buffered and handed on untouched.
pub async fn verify_csrf(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| AppError::bad_request("Invalid form body"))?;
    let field: CsrfField = serde_urlencoded::from_bytes(&bytes).unwrap_or_default();

    let identity = state.authorizer.identity(&parts.headers);
    let path = parts.uri.path();
    if !state.csrf.validate(&field.csrf, &identity, path) {
        warn!("Rejected request to {}: invalid CSRF token", path);
        return Err(AppError::InvalidCsrfToken);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
