use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::repo::StoreError;

/// Failure of a register or login call.
///
/// Every variant except `Storage` and `MissingSigningKey` is caused by the
/// client and surfaces as `400`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("User not found")]
    NotFound,

    #[error("Invalid password")]
    Authentication,

    #[error("storage failure during {during}: {source:#}")]
    Storage {
        during: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("JWT_SECRET is not configured; cannot issue tokens during {during}")]
    MissingSigningKey { during: &'static str },
}

impl AuthError {
    pub fn storage(during: &'static str, source: impl Into<anyhow::Error>) -> Self {
        AuthError::Storage {
            during,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Storage { .. } | AuthError::MissingSigningKey { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Map a store failure, keeping uniqueness violations as client errors.
    pub fn from_store(during: &'static str, e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::DuplicateUsername => AuthError::DuplicateUsername,
            StoreError::Backend(source) => AuthError::Storage { during, source },
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::Storage { during, .. } | AuthError::MissingSigningKey { during } => {
                error!(error = %self, "request failed");
                format!("Server error during {during}")
            }
            client => client.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
