use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info};

use parley_types::api::{LoginRequest, RegisterRequest, TokenResponse};

use crate::{AppState, run_blocking};

const MAX_USERNAME_LEN: usize = 32;

/// POST /auth/register: create the user and log them straight in.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.username.is_empty() || req.username.chars().count() > MAX_USERNAME_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Argon2 is CPU-bound, so hashing runs on the blocking pool with the insert.
    let db = state.clone();
    let user = run_blocking(move || db.users.register(&req)).await?;

    let token = issue(&state, &user.username)?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// POST /auth/login: check credentials, stamp the login, return a token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let username = req.username.clone();
    let authenticated =
        run_blocking(move || db.users.authenticate(&req.username, &req.password)).await?;

    if !authenticated {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = issue(&state, &username)?;

    let db = state.clone();
    let user = run_blocking(move || db.users.update_login_timestamp(&username)).await?;
    info!("{} logged in", user.username);

    Ok(Json(TokenResponse { token }))
}

fn issue(state: &AppState, username: &str) -> Result<String, StatusCode> {
    state.tokens.issue_for(username).map_err(|e| {
        error!("Failed to sign token for {}: {}", username, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
