//! Route wiring.
//!
//! Two route trees, one per audience, each behind its own authentication
//! stage. `/health` stays outside both so probes need no credential.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::{HeaderMap, StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{delete, get},
};
use serde_json::json;

use latchkey_auth::{Resolver, RoleDirectory, TokenGateway};

use crate::context::PrincipalContext;
use crate::errors::ApiError;
use crate::extract::token_from_request;
use crate::middleware::{AuthState, authentication};

/// Everything the router needs, injected by the caller.
pub struct AppDeps {
    pub user_gateway: Arc<TokenGateway>,
    pub admin_gateway: Arc<TokenGateway>,
    pub directory: Arc<dyn RoleDirectory>,
}

pub fn build_app(deps: AppDeps) -> Router {
    let user = Router::new()
        .route("/whoami", get(whoami))
        .route("/accessions", get(accessions))
        .route("/session", delete(signout))
        .layer(Extension(deps.user_gateway.clone()))
        .layer(middleware::from_fn_with_state(
            AuthState {
                gateway: deps.user_gateway,
            },
            authentication,
        ));

    let admin = Router::new()
        .route("/whoami", get(whoami))
        .layer(middleware::from_fn_with_state(
            AuthState {
                gateway: deps.admin_gateway,
            },
            authentication,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/user", user)
        .nest("/admin", admin)
        .layer(Extension(deps.directory))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(json!({
        "principal_id": principal.principal_id().to_string(),
        "kind": principal.kind().as_str(),
    }))
}

async fn accessions(
    Extension(directory): Extension<Arc<dyn RoleDirectory>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<impl IntoResponse, ApiError> {
    let resolver = Resolver::new(directory.as_ref(), principal.principal_id()).await?;
    let granted: Vec<&'static str> = resolver
        .effective_accessions()
        .into_iter()
        .map(|accession| accession.as_str())
        .collect();

    Ok(Json(json!({
        "principal_id": principal.principal_id().to_string(),
        "accessions": granted,
    })))
}

/// Revokes the session presented with this request.
async fn signout(
    Extension(gateway): Extension<Arc<TokenGateway>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    // Authentication already verified this token; pull it again so the
    // revocation targets exactly the credential the caller presented.
    let token = token_from_request(&uri, &headers).ok_or(ApiError::InvalidAuth)?;
    gateway.revoke(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
