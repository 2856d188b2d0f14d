//! Response envelope for mutations and the HTTP mapping of [`Error`].
//!
//! Reads return their data as plain JSON. Every mutation, successful or not,
//! replies with an [`ActionResponse`]:
//!
//! ```json
//! { "success": true, "message": "تم الحفظ بنجاح", "data": { ... } }
//! { "success": false, "message": "هذا الحقل مطلوب", "field": "name" }
//! ```

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, Error>;

/// Envelope returned by every mutation.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    /// Whether the action went through
    pub success: bool,
    /// Message shown to the visitor as a toast
    pub message: String,
    /// Affected record, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Form field the message refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// Successful mutation carrying the affected record.
pub fn done<T: Serialize>(message: impl Into<String>, data: T) -> Json<ActionResponse<T>> {
    Json(ActionResponse {
        success: true,
        message: message.into(),
        data: Some(data),
        field: None,
    })
}

/// Successful mutation with nothing to return.
pub fn done_empty(message: impl Into<String>) -> Json<ActionResponse<()>> {
    Json(ActionResponse {
        success: true,
        message: message.into(),
        data: None,
        field: None,
    })
}

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } | Self::InUse { .. } => StatusCode::CONFLICT,
            Self::LimitReached { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Toml(_)
            | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            e if e.is_internal() => error!(error = %e, "request failed"),
            Self::Forbidden { message } => warn!(reason = %message, "request forbidden"),
            _ => {}
        }

        let field = match &self {
            Self::Validation { field, .. } => Some(*field),
            _ => None,
        };
        let body = Json(ActionResponse::<()> {
            success: false,
            message: self.user_message(),
            data: None,
            field,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::GENERIC_FAILURE_MESSAGE;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let response = Error::validation("name", "هذا الحقل مطلوب").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "هذا الحقل مطلوب");
        assert_eq!(body["field"], "name");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let err = Error::Database(sea_orm::DbErr::Custom("locked".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::not_found("dish", 3).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::duplicate("cuisine", "syrian").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::LimitReached {
                entity: "video",
                limit: 5
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
