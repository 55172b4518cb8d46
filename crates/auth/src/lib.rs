//! `latchkey-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: stateful
//! pieces ride on the [`cache::TtlCache`] and [`resolver::RoleDirectory`]
//! ports, everything else is deterministic.

pub mod accession;
pub mod cache;
pub mod claims;
pub mod credential;
pub mod gateway;
pub mod principal;
pub mod resolver;
pub mod role;

pub use accession::Accession;
pub use cache::{CacheError, MemoryCache, Namespace, TtlCache};
pub use claims::{ClaimsError, TokenClaims, validate_claims};
pub use credential::{
    Channel, CredentialError, CredentialStore, generate_code, generate_numeric_code,
};
pub use gateway::{TokenError, TokenGateway};
pub use principal::{PrincipalId, PrincipalKind};
pub use resolver::{DirectoryError, MemoryDirectory, Resolver, ResolverError, RoleDirectory};
pub use role::Role;
