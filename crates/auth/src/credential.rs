use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

use crate::cache::{CacheError, Namespace, TtlCache};

/// Purpose a one-shot code was minted for.
///
/// Channels never share a namespace: a code minted for email sign-in can
/// not confirm a password reset, even on an incidental collision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Account activation links.
    Activation,
    /// Email sign-in codes (code maps to the email it was sent to).
    AuthEmail,
    /// SMS sign-in codes (code maps to the phone it was sent to).
    AuthPhone,
    /// Password reset confirmations.
    PasswordReset,
    /// Third-party account linking handshakes.
    OAuthLink,
}

impl Channel {
    pub fn namespace(&self) -> Namespace {
        match self {
            Channel::Activation => Namespace::new("code:activation"),
            Channel::AuthEmail => Namespace::new("code:auth_email"),
            Channel::AuthPhone => Namespace::new("code:auth_phone"),
            Channel::PasswordReset => Namespace::new("code:password_reset"),
            Channel::OAuthLink => Namespace::new("code:oauth"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Never stored, already consumed, expired, or minted for a
    /// different channel.
    #[error("credential not found")]
    NotFound,

    #[error("credential store error: {0}")]
    Store(#[from] CacheError),
}

/// Short-lived, single-use codes handed to a principal out of band.
///
/// Possession of the delivery channel is the proof; the store only
/// guarantees that a code redeems at most once, within its TTL, for the
/// purpose it was minted for.
pub struct CredentialStore {
    cache: Arc<dyn TtlCache>,
}

impl CredentialStore {
    pub fn new(cache: Arc<dyn TtlCache>) -> Self {
        Self { cache }
    }

    /// Store `value` under `code` for `ttl`.
    pub async fn put(
        &self,
        channel: Channel,
        code: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CredentialError> {
        self.cache.put(channel.namespace(), code, value, ttl).await?;
        Ok(())
    }

    /// Redeem a code, returning the value stored with it.
    ///
    /// The read-and-remove is one atomic step, so two racing redemptions
    /// of the same code can never both succeed.
    pub async fn consume(&self, channel: Channel, code: &str) -> Result<String, CredentialError> {
        match self.cache.take(channel.namespace(), code).await? {
            Some(value) => Ok(value),
            None => Err(CredentialError::NotFound),
        }
    }

    /// Discard a code that was minted but never delivered, instead of
    /// leaving it live until the TTL runs out.
    pub async fn delete(&self, channel: Channel, code: &str) -> Result<(), CredentialError> {
        self.cache.delete(channel.namespace(), code).await?;
        Ok(())
    }
}

/// 8 hex characters, for email-delivered codes and activation links.
pub fn generate_code() -> String {
    let bytes: [u8; 4] = rand::random();
    hex::encode(bytes)
}

/// 6 decimal digits, for SMS delivery.
pub fn generate_numeric_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryCache::new()))
    }

    const TTL: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn codes_redeem_exactly_once() {
        let store = store();
        store
            .put(Channel::AuthEmail, "a1b2c3d4", "user@example.com", TTL)
            .await
            .unwrap();

        let value = store.consume(Channel::AuthEmail, "a1b2c3d4").await.unwrap();
        assert_eq!(value, "user@example.com");

        assert!(matches!(
            store.consume(Channel::AuthEmail, "a1b2c3d4").await,
            Err(CredentialError::NotFound)
        ));
    }

    #[tokio::test]
    async fn channels_are_partitioned() {
        let store = store();
        store
            .put(Channel::AuthEmail, "a1b2c3d4", "user@example.com", TTL)
            .await
            .unwrap();

        assert!(matches!(
            store.consume(Channel::PasswordReset, "a1b2c3d4").await,
            Err(CredentialError::NotFound)
        ));
        // The entry is untouched in its own channel.
        assert!(store.consume(Channel::AuthEmail, "a1b2c3d4").await.is_ok());
    }

    #[tokio::test]
    async fn expired_codes_do_not_redeem() {
        let store = store();
        store
            .put(
                Channel::AuthPhone,
                "394820",
                "+15550100",
                Duration::from_millis(10),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(matches!(
            store.consume(Channel::AuthPhone, "394820").await,
            Err(CredentialError::NotFound)
        ));
    }

    #[tokio::test]
    async fn undelivered_codes_can_be_discarded() {
        let store = store();
        store
            .put(Channel::Activation, "deadbeef", "user@example.com", TTL)
            .await
            .unwrap();
        store.delete(Channel::Activation, "deadbeef").await.unwrap();

        assert!(matches!(
            store.consume(Channel::Activation, "deadbeef").await,
            Err(CredentialError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unknown_codes_miss() {
        let store = store();
        assert!(matches!(
            store.consume(Channel::OAuthLink, "nope").await,
            Err(CredentialError::NotFound)
        ));
    }

    #[test]
    fn generated_codes_are_eight_hex_chars() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn numeric_codes_are_six_digits() {
        for _ in 0..32 {
            let code = generate_numeric_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
