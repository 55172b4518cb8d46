//! Infrastructure layer: Redis cache and Postgres role directory adapters.
//!
//! The ports these implement live in `latchkey-auth`; nothing here adds
//! semantics, only technology.

pub mod cache;
pub mod directory;

#[cfg(feature = "redis")]
pub use cache::RedisCache;
pub use directory::PgDirectory;
