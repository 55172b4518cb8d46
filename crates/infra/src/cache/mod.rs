//! Cache adapters implementing the auth crate's TTL cache port.
//!
//! The in-memory implementation lives next to the port itself; this module
//! holds the shared-infrastructure ones.

#[cfg(feature = "redis")]
pub mod redis_cache;

#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
