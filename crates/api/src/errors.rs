use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use latchkey_auth::{CredentialError, DirectoryError, ResolverError, TokenError};

/// Failure surface of the HTTP layer.
///
/// Whatever goes wrong inside the pipeline, clients see a stable
/// `{"error": <code>, "message": <text>}` body. Infrastructure faults are
/// deliberately opaque over the wire; the detail goes to the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request carried no credential at all.
    #[error("authentication credential missing")]
    InvalidAuth,

    /// A credential was presented but failed verification.
    #[error("token is invalid")]
    InvalidToken,

    /// The principal holds none of the accessions the route demands.
    #[error("permission denied")]
    NoPermission,

    /// The principal resolved to zero roles, so nothing can be granted.
    #[error("principal has no roles")]
    PrincipalNotPermitted,

    /// A transient credential was absent, expired, or already consumed.
    #[error("credential not found")]
    CredentialNotFound,

    /// Infrastructure fault. Details stay in the logs.
    #[error("internal error")]
    Unknown,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAuth | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::NoPermission | ApiError::PrincipalNotPermitted => StatusCode::FORBIDDEN,
            ApiError::CredentialNotFound => StatusCode::NOT_FOUND,
            ApiError::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidAuth => "invalid_auth",
            ApiError::InvalidToken => "invalid_token",
            ApiError::NoPermission => "no_permission",
            ApiError::PrincipalNotPermitted => "principal_not_permitted",
            ApiError::CredentialNotFound => "credential_not_found",
            ApiError::Unknown => "unknown",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        json_error(self.status(), self.code(), self.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => ApiError::InvalidToken,
            // Fail closed: if the gateway cannot sign or cannot reach the
            // revocation store, the request is refused rather than waved on.
            TokenError::Signing(_) | TokenError::Store(_) => {
                tracing::error!(error = %err, "token gateway fault");
                ApiError::Unknown
            }
        }
    }
}

impl From<ResolverError> for ApiError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::NotPermitted => ApiError::PrincipalNotPermitted,
            ResolverError::Directory(DirectoryError::PrincipalNotFound) => {
                tracing::warn!("principal missing from the role directory");
                ApiError::NoPermission
            }
            ResolverError::Directory(DirectoryError::Unavailable(reason)) => {
                tracing::error!(%reason, "role directory unavailable");
                ApiError::Unknown
            }
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NotFound => ApiError::CredentialNotFound,
            CredentialError::Store(fault) => {
                tracing::error!(error = %fault, "credential store fault");
                ApiError::Unknown
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
