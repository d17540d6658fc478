//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, hashes it, and resolves the
//! owning user by `token_hash`. On success `AuthedUser` is injected into
//! request extensions for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{hash_token, ApiContext, AuthedUser};
use crate::db::{open_database, repository};

/// Require a valid bearer token.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer, which must be outermost).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // Resolve the user before the request runs; the connection is dropped
    // before any .await.
    let user = {
        let conn = open_database(&ctx.db_path)?;
        repository::get_user_by_token_hash(&conn, &hash_token(&token))?
            .ok_or(ApiError::Unauthorized)?
    };

    req.extensions_mut().insert(AuthedUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(req).await)
}
