use std::sync::Arc;

use axum::{extract::State, middleware::Next, response::Response};

use latchkey_auth::{Accession, Resolver, RoleDirectory, TokenGateway};

use crate::context::PrincipalContext;
use crate::errors::ApiError;
use crate::extract::token_from_request;

/// State for the authentication stage: the gateway verifying this route tree.
///
/// Mount one instance per audience. A user tree and an admin tree each get
/// their own gateway, so a token minted for one kind is garbage to the other.
#[derive(Clone)]
pub struct AuthState {
    pub gateway: Arc<TokenGateway>,
}

/// Verifies the request's credential and records who is calling.
///
/// No credential at all and a credential that fails verification are kept
/// distinct so clients can tell "you forgot the token" from "your session
/// is dead".
pub async fn authentication(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_request(req.uri(), req.headers()).ok_or(ApiError::InvalidAuth)?;

    let principal = state.gateway.parse(&token).await?;

    req.extensions_mut()
        .insert(PrincipalContext::new(principal, state.gateway.kind()));

    Ok(next.run(req).await)
}

/// State for the permission stage: the directory and the accessions that
/// satisfy the route. A principal holding any one of them passes.
#[derive(Clone)]
pub struct PermissionState {
    pub directory: Arc<dyn RoleDirectory>,
    pub required: Arc<[Accession]>,
}

/// Resolves the caller's roles and refuses the request unless at least one
/// required accession is granted.
pub async fn permission(
    State(state): State<PermissionState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // This stage runs behind authentication. A missing context means the
    // stages were wired out of order, and the request is refused.
    let principal = req
        .extensions()
        .get::<PrincipalContext>()
        .copied()
        .ok_or(ApiError::NoPermission)?;

    let resolver = Resolver::new(state.directory.as_ref(), principal.principal_id()).await?;
    if !resolver.require(&state.required) {
        return Err(ApiError::NoPermission);
    }

    Ok(next.run(req).await)
}
