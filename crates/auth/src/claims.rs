use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{PrincipalId, PrincipalKind};

/// Session token claims (transport-agnostic).
///
/// Roles are intentionally absent: permissions are resolved fresh on every
/// request, so a token only ever proves identity and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Audience kind the token was minted for.
    pub kind: PrincipalKind,

    /// Per-session identifier; the unit of revocation.
    pub jti: Uuid,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate token claims.
///
/// Note: this validates the *claims* only. Signature verification happens
/// in the gateway before these checks run.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), ClaimsError> {
    if claims.expires_at <= claims.issued_at {
        return Err(ClaimsError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(ClaimsError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(ClaimsError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            sub: PrincipalId::new(),
            kind: PrincipalKind::User,
            jti: Uuid::now_v7(),
            issued_at,
            expires_at,
        }
    }

    #[test]
    fn accepts_a_live_window() {
        let now = Utc::now();
        let claims = claims(now - Duration::minutes(5), now + Duration::minutes(25));
        assert_eq!(validate_claims(&claims, now), Ok(()));
    }

    #[test]
    fn rejects_an_elapsed_window() {
        let now = Utc::now();
        let claims = claims(now - Duration::hours(2), now - Duration::hours(1));
        assert_eq!(validate_claims(&claims, now), Err(ClaimsError::Expired));
    }

    #[test]
    fn rejects_claims_from_the_future() {
        let now = Utc::now();
        let claims = claims(now + Duration::minutes(5), now + Duration::minutes(35));
        assert_eq!(validate_claims(&claims, now), Err(ClaimsError::NotYetValid));
    }

    #[test]
    fn rejects_an_inverted_window() {
        let now = Utc::now();
        let claims = claims(now, now - Duration::minutes(1));
        assert_eq!(
            validate_claims(&claims, now),
            Err(ClaimsError::InvalidTimeWindow)
        );
    }
}
