use axum::http::StatusCode;
use tracing::error;

use parley_db::DbError;

/// Status code for a repository failure. Anything that is not the caller's
/// fault is logged here, since the response body stays empty.
pub fn status_for(err: &DbError) -> StatusCode {
    match err {
        DbError::Conflict(_) => StatusCode::CONFLICT,
        DbError::NotFound(_) => StatusCode::NOT_FOUND,
        DbError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
        DbError::Crypto(_) | DbError::Sqlite(_) | DbError::Poisoned(_) => {
            error!("Repository failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(status_for(&DbError::Conflict("user a".into())), StatusCode::CONFLICT);
        assert_eq!(status_for(&DbError::NotFound("user a".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&DbError::InvalidMessage("a -> a".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DbError::Poisoned("writer")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
