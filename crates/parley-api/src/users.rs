use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use parley_types::api::{
    Claims, ReceivedMessagesResponse, SentMessagesResponse, UserListResponse, UserResponse,
};

use crate::middleware::ensure_correct_user;
use crate::{AppState, run_blocking};

/// GET /users: any logged-in user may browse the directory.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let users = run_blocking(move || state.users.all()).await?;
    Ok(Json(UserListResponse { users }))
}

/// GET /users/{username}
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    ensure_correct_user(&claims, &username)?;

    let user = run_blocking(move || state.users.get(&username)).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/{username}/to
pub async fn messages_to(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    ensure_correct_user(&claims, &username)?;

    let messages = run_blocking(move || state.messages.messages_to(&username)).await?;
    Ok(Json(ReceivedMessagesResponse { messages }))
}

/// GET /users/{username}/from
pub async fn messages_from(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    ensure_correct_user(&claims, &username)?;

    let messages = run_blocking(move || state.messages.messages_from(&username)).await?;
    Ok(Json(SentMessagesResponse { messages }))
}
