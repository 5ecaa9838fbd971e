//! Error conversions - HTTP integration for [`AppError`]
//!
//! Maps axum body rejections onto [`AppError`] and renders
//! errors as `{"message": ..., "errors": {...}}` JSON bodies.

#[cfg(feature = "axum")]
use super::app_error::AppError;
#[cfg(feature = "axum")]
use super::kind::ErrorKind;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl From<axum::extract::rejection::BytesRejection> for AppError {
    fn from(rejection: axum::extract::rejection::BytesRejection) -> Self {
        let kind = match rejection.status().as_u16() {
            413 => ErrorKind::PayloadTooLarge,
            400 => ErrorKind::BadRequest,
            _ => ErrorKind::InternalServerError,
        };
        AppError::new(kind, rejection.body_text()).with_source(rejection)
    }
}

#[cfg(feature = "axum")]
#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a crate::validation::FieldErrors>,
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorBody {
            message: self.message(),
            errors: self.errors(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use crate::validation::FieldErrors;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_follows_kind() {
        let response = AppError::unauthorized("Unauthenticated.").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut errors = FieldErrors::new();
        errors.add("email", "The email field is required.");
        let response = AppError::validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_body_omits_empty_errors() {
        let err = AppError::not_found("Not Found");
        let body = ErrorBody {
            message: err.message(),
            errors: err.errors(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "message": "Not Found" })
        );
    }
}
