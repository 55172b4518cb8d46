//! Role directory adapters implementing the auth crate's lookup port.

pub mod postgres;

pub use postgres::PgDirectory;
