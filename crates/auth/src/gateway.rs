use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::cache::{CacheError, Namespace, TtlCache};
use crate::claims::{TokenClaims, validate_claims};
use crate::principal::{PrincipalId, PrincipalKind};

const USER_SESSIONS: Namespace = Namespace::new("token:user");
const ADMIN_SESSIONS: Namespace = Namespace::new("token:admin");

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, tampered, expired, revoked, or minted for another kind.
    #[error("invalid token")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("session store error: {0}")]
    Store(#[from] CacheError),
}

/// Issues, verifies, and revokes bearer tokens for one audience kind.
///
/// Kinds are isolated end to end: each gateway holds its own signing
/// secret and its own revocation namespace, so user and admin sessions
/// share no state whatsoever. Dependencies are injected; a gateway never
/// reaches for process-global clients.
pub struct TokenGateway {
    kind: PrincipalKind,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    revocations: Arc<dyn TtlCache>,
}

impl TokenGateway {
    pub fn new(
        kind: PrincipalKind,
        secret: &[u8],
        ttl: Duration,
        revocations: Arc<dyn TtlCache>,
    ) -> Self {
        // Signature check only. The time window lives in the claims as
        // RFC 3339 timestamps and is validated explicitly in parse().
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            kind,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            revocations,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    /// Mint a signed session token for `principal`.
    pub fn issue(&self, principal: PrincipalId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: principal,
            kind: self.kind,
            jti: Uuid::now_v7(),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a presented token and return the principal it names.
    ///
    /// Fails closed: a store fault during the revocation check is an
    /// error, never a pass.
    pub async fn parse(&self, token: &str) -> Result<PrincipalId, TokenError> {
        let claims = self.decode(token).ok_or(TokenError::Invalid)?;
        // Disjoint secrets already reject cross-kind tokens; the claim
        // check keeps that true even if both kinds were misconfigured
        // with the same secret.
        if claims.kind != self.kind {
            return Err(TokenError::Invalid);
        }
        validate_claims(&claims, Utc::now()).map_err(|_| TokenError::Invalid)?;
        let revoked = self
            .revocations
            .get(self.sessions(), &claims.jti.to_string())
            .await?;
        if revoked.is_some() {
            return Err(TokenError::Invalid);
        }
        Ok(claims.sub)
    }

    /// Invalidate a session so every later [`parse`](Self::parse) of the
    /// same token fails.
    ///
    /// Idempotent. A token that no longer verifies (garbage, expired,
    /// wrong kind) is already dead and revokes as a successful no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), TokenError> {
        let Some(claims) = self.decode(token) else {
            return Ok(());
        };
        if claims.kind != self.kind {
            return Ok(());
        }
        let remaining = claims.expires_at - Utc::now();
        let Ok(denylist_ttl) = remaining.to_std() else {
            // Already expired; the clock does the rest.
            return Ok(());
        };
        self.revocations
            .put(
                self.sessions(),
                &claims.jti.to_string(),
                "revoked",
                denylist_ttl,
            )
            .await?;
        tracing::debug!(kind = %self.kind, jti = %claims.jti, "session revoked");
        Ok(())
    }

    fn decode(&self, token: &str) -> Option<TokenClaims> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .ok()
    }

    fn sessions(&self) -> Namespace {
        match self.kind {
            PrincipalKind::User => USER_SESSIONS,
            PrincipalKind::Admin => ADMIN_SESSIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn gateway(kind: PrincipalKind, secret: &[u8], ttl: Duration) -> TokenGateway {
        TokenGateway::new(kind, secret, ttl, Arc::new(MemoryCache::new()))
    }

    #[tokio::test]
    async fn issued_tokens_parse_back_to_the_principal() {
        let gw = gateway(PrincipalKind::User, b"user-secret", Duration::minutes(30));
        let principal = PrincipalId::new();
        let token = gw.issue(principal).unwrap();
        assert_eq!(gw.parse(&token).await.unwrap(), principal);
    }

    #[tokio::test]
    async fn kinds_reject_each_other_s_tokens() {
        let users = gateway(PrincipalKind::User, b"user-secret", Duration::minutes(30));
        let admins = gateway(PrincipalKind::Admin, b"admin-secret", Duration::minutes(30));
        let token = users.issue(PrincipalId::new()).unwrap();
        assert!(matches!(admins.parse(&token).await, Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn a_shared_secret_still_rejects_the_wrong_kind() {
        let users = gateway(PrincipalKind::User, b"oops-same", Duration::minutes(30));
        let admins = gateway(PrincipalKind::Admin, b"oops-same", Duration::minutes(30));
        let token = users.issue(PrincipalId::new()).unwrap();
        assert!(matches!(admins.parse(&token).await, Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected() {
        let gw = gateway(PrincipalKind::User, b"user-secret", Duration::milliseconds(10));
        let token = gw.issue(PrincipalId::new()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert!(matches!(gw.parse(&token).await, Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn tampered_tokens_are_rejected() {
        let gw = gateway(PrincipalKind::User, b"user-secret", Duration::minutes(30));
        let mut token = gw.issue(PrincipalId::new()).unwrap();
        let flipped = if token.ends_with('A') { 'B' } else { 'A' };
        token.pop();
        token.push(flipped);
        assert!(matches!(gw.parse(&token).await, Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected() {
        let gw = gateway(PrincipalKind::User, b"user-secret", Duration::minutes(30));
        assert!(matches!(gw.parse("not-a-token").await, Err(TokenError::Invalid)));
        assert!(matches!(gw.parse("").await, Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn revoked_tokens_stop_parsing() {
        let gw = gateway(PrincipalKind::User, b"user-secret", Duration::minutes(30));
        let token = gw.issue(PrincipalId::new()).unwrap();
        assert!(gw.parse(&token).await.is_ok());

        gw.revoke(&token).await.unwrap();
        assert!(matches!(gw.parse(&token).await, Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn revoking_one_session_leaves_others_alive() {
        let gw = gateway(PrincipalKind::User, b"user-secret", Duration::minutes(30));
        let principal = PrincipalId::new();
        let first = gw.issue(principal).unwrap();
        let second = gw.issue(principal).unwrap();

        gw.revoke(&first).await.unwrap();
        assert!(matches!(gw.parse(&first).await, Err(TokenError::Invalid)));
        assert_eq!(gw.parse(&second).await.unwrap(), principal);
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_tolerates_garbage() {
        let gw = gateway(PrincipalKind::User, b"user-secret", Duration::minutes(30));
        let token = gw.issue(PrincipalId::new()).unwrap();
        gw.revoke(&token).await.unwrap();
        gw.revoke(&token).await.unwrap();
        gw.revoke("not-a-token").await.unwrap();
    }
}
