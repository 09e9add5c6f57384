use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use skillswap_engine::Engine;
use skillswap_types::api::{ActionOutcome, FailureKind};

use crate::auth::AppState;

/// An engine outcome on the wire: the JSON body as-is, with the HTTP status
/// taken from the failure class.
pub struct Reply(pub ActionOutcome);

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = match self.0.failure {
            None => StatusCode::OK,
            Some(FailureKind::Validation) => StatusCode::BAD_REQUEST,
            Some(FailureKind::Forbidden) => StatusCode::FORBIDDEN,
            Some(FailureKind::NotFound) => StatusCode::NOT_FOUND,
            Some(FailureKind::Conflict) => StatusCode::CONFLICT,
            Some(FailureKind::Storage) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0)).into_response()
    }
}

/// Runs engine work off the async runtime.
pub(crate) async fn blocking<T, F>(state: &AppState, work: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Engine) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || work(&state.engine))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kinds_map_to_statuses() {
        let cases = [
            (ActionOutcome::ok("done", None), StatusCode::OK),
            (ActionOutcome::failed(FailureKind::Validation, "x"), StatusCode::BAD_REQUEST),
            (ActionOutcome::failed(FailureKind::Forbidden, "x"), StatusCode::FORBIDDEN),
            (ActionOutcome::failed(FailureKind::NotFound, "x"), StatusCode::NOT_FOUND),
            (ActionOutcome::failed(FailureKind::Conflict, "x"), StatusCode::CONFLICT),
            (ActionOutcome::failed(FailureKind::Storage, "x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (outcome, status) in cases {
            assert_eq!(Reply(outcome).into_response().status(), status);
        }
    }
}
