use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reelquest_core::error::{ApiError, ErrorEnvelope};
use reelquest_enrich::EnrichError;

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<EnrichError> for AppError {
    fn from(e: EnrichError) -> Self {
        let api = match e {
            EnrichError::InvalidInput(msg) => ApiError::BadRequest(msg),
            EnrichError::NotFound => ApiError::NotFound("title not found in catalog".into()),
            EnrichError::Provider(msg) | EnrichError::Network(msg) => ApiError::BadGateway(msg),
            EnrichError::Db(e) => ApiError::Internal(format!("db error: {e}")),
        };
        Self(api)
    }
}
