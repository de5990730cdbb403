pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tracing::error;

use parley_crypto::{CredentialStore, TokenIssuer};
use parley_db::{Database, DbError, MessageRepository, UserRepository};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserRepository,
    pub messages: MessageRepository,
    pub tokens: TokenIssuer,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, credentials: CredentialStore, tokens: TokenIssuer) -> AppState {
        Arc::new(Self {
            users: UserRepository::new(db.clone(), credentials),
            messages: MessageRepository::new(db),
            tokens,
        })
    }
}

/// All REST routes. `/auth/*` is public, everything else needs a bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{username}", get(users::get_user))
        .route("/users/{username}/to", get(users::messages_to))
        .route("/users/{username}/from", get(users::messages_from))
        .route("/messages", post(messages::send_message))
        .route("/messages/{id}", get(messages::get_message))
        .route("/messages/{id}/read", post(messages::mark_read))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Run a repository call on the blocking pool and map its error to a status.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, StatusCode>
where
    F: FnOnce() -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| error::status_for(&e))
}
