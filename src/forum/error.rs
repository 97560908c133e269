use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::types::MessageResponse;
use crate::auth::Unauthenticated;

/// Failures a forum operation can surface to a client.
///
/// Ownership failures and missing resources both map to [`ForumError::NotFound`]
/// so callers cannot probe for the existence of resources they do not own.
#[derive(Debug, thiserror::Error)]
pub enum ForumError {
    #[error("Invalid arguments: {0}")]
    Validation(&'static str),
    #[error("Bad arguments")]
    BadRequest,
    #[error("User must be authorized.")]
    Unauthenticated,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("not found")]
    NotFound,
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl ForumError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the cause and collapse it into a client-safe persistence failure.
    pub(crate) fn persistence(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{context}: {err}");
        Self::Persistence(context.to_string())
    }
}

impl From<Unauthenticated> for ForumError {
    fn from(_: Unauthenticated) -> Self {
        Self::Unauthenticated
    }
}

impl IntoResponse for ForumError {
    /// Every failure is a JSON `{"message": ...}` body; persistence causes stay server-side.
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Persistence(_) => "error".to_string(),
            other => other.to_string(),
        };
        (self.status(), Json(MessageResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ForumError::Validation("username").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ForumError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ForumError::Unauthenticated.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ForumError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ForumError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ForumError::Persistence("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_message_names_field() {
        assert_eq!(
            ForumError::Validation("mobile").to_string(),
            "Invalid arguments: mobile"
        );
    }

    #[tokio::test]
    async fn persistence_response_hides_cause() -> Result<(), Box<dyn std::error::Error>> {
        let response = ForumError::Persistence("db exploded at 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json, serde_json::json!({ "message": "error" }));
        Ok(())
    }
}
