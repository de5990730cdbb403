use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use parley_types::api::{
    Claims, MessageDetailResponse, MessageResponse, ReadReceiptResponse, SendMessageRequest,
};

use crate::{AppState, run_blocking};

/// POST /messages: send as the token's user.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let message = run_blocking(move || {
        state
            .messages
            .create(&claims.username, &req.to_username, &req.body)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

/// GET /messages/{id}: visible to its sender and its recipient only.
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let message = run_blocking(move || state.messages.get(id)).await?;

    if !message.involves(&claims.username) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Json(MessageDetailResponse { message }))
}

/// POST /messages/{id}/read: only the recipient can mark a message read.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let message = run_blocking(move || db.messages.get(id)).await?;

    if message.to_user.username != claims.username {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let receipt = run_blocking(move || state.messages.mark_read(id)).await?;
    Ok(Json(ReadReceiptResponse { message: receipt }))
}
