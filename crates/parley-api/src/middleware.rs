use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::warn;

use parley_types::api::Claims;

use crate::AppState;

/// Validate the bearer token and stash its claims for the handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state.tokens.verify(bearer.token()).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// The path names a user; only that user may proceed.
pub fn ensure_correct_user(claims: &Claims, username: &str) -> Result<(), StatusCode> {
    if claims.username == username {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
