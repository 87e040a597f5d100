use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use rester_core::persistence::NormalizedError;

/// Route-layer wrapper that renders a [`NormalizedError`] as an HTTP response.
///
/// The body is the error's `{status, message, data}` JSON.
#[derive(Debug)]
pub struct ApiError(pub NormalizedError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Persistence error");
        } else {
            tracing::debug!(status = self.0.status, error = %self.0, "Persistence error");
        }

        (status, Json(self.0)).into_response()
    }
}

impl From<NormalizedError> for ApiError {
    fn from(err: NormalizedError) -> Self {
        Self(err)
    }
}
