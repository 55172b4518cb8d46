//! Redis-backed TTL cache for shared, multi-process deployments.
//!
//! Keys are `{namespace}:{key}`. Single-use consumption rides on GETDEL,
//! expiry on the Redis TTL clock. Every command runs under an explicit
//! deadline so a hung cache can never hold a request open; hitting the
//! deadline is a fault, and callers treat faults as a deny.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::instrument;

use latchkey_auth::cache::{CacheError, Namespace, TtlCache};

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCache {
    /// Connect to `redis_url` (e.g. "redis://localhost:6379").
    ///
    /// The connection manager reconnects on its own after transient
    /// failures; commands issued while disconnected fail fast.
    pub async fn connect(redis_url: impl AsRef<str>) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        Ok(Self {
            conn,
            op_timeout: DEFAULT_OP_TIMEOUT,
        })
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    fn full_key(ns: Namespace, key: &str) -> String {
        format!("{}:{}", ns.prefix(), key)
    }

    async fn run<T>(&self, cmd: redis::Cmd) -> Result<T, CacheError>
    where
        T: redis::FromRedisValue + Send,
    {
        let mut conn = self.conn.clone();
        let query = async move { cmd.query_async::<_, T>(&mut conn).await };
        match tokio::time::timeout(self.op_timeout, query).await {
            Ok(reply) => reply.map_err(|e| CacheError::Unavailable(e.to_string())),
            Err(_) => Err(CacheError::Timeout),
        }
    }
}

#[async_trait]
impl TtlCache for RedisCache {
    #[instrument(skip(self, value), fields(ns = %ns), err)]
    async fn put(
        &self,
        ns: Namespace,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let mut cmd = redis::cmd("SET");
        cmd.arg(Self::full_key(ns, key))
            .arg(value)
            .arg("PX")
            .arg(ttl_ms);
        self.run::<()>(cmd).await
    }

    #[instrument(skip(self), fields(ns = %ns), err)]
    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, CacheError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(Self::full_key(ns, key));
        self.run(cmd).await
    }

    #[instrument(skip(self), fields(ns = %ns), err)]
    async fn take(&self, ns: Namespace, key: &str) -> Result<Option<String>, CacheError> {
        // GETDEL is the whole point: read and remove in one server-side
        // step, so two racing consumers can never both see the value.
        let mut cmd = redis::cmd("GETDEL");
        cmd.arg(Self::full_key(ns, key));
        self.run(cmd).await
    }

    #[instrument(skip(self), fields(ns = %ns), err)]
    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), CacheError> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(Self::full_key(ns, key));
        self.run::<()>(cmd).await
    }
}
