use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use crate::accession::Accession;
use crate::principal::PrincipalId;
use crate::role::Role;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The principal has no record at all (deleted between token issuance
    /// and this lookup).
    #[error("principal not found")]
    PrincipalNotFound,

    #[error("role directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup port for principal role assignments and role records.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Role names assigned to a principal.
    async fn principal_roles(&self, principal: PrincipalId)
    -> Result<Vec<String>, DirectoryError>;

    /// Resolve one role by name. `Ok(None)` means the name no longer
    /// exists (deleted or renamed role); that is not an error.
    async fn role(&self, name: &str) -> Result<Option<Role>, DirectoryError>;
}

#[derive(Debug, Error)]
pub enum ResolverError {
    /// The principal holds no roles at all and can never pass a check.
    #[error("principal holds no roles")]
    NotPermitted,

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// The permissions of one principal at one instant.
///
/// Built fresh for every request and discarded afterwards, so role and
/// permission changes take effect on the next request with no cache to
/// invalidate.
#[derive(Debug, Clone)]
pub struct Resolver {
    principal: PrincipalId,
    roles: Vec<Role>,
}

impl Resolver {
    /// Load and resolve `principal`'s roles.
    ///
    /// Assigned names that no longer resolve to a role record are skipped
    /// with a warning; a principal with zero assigned names is refused
    /// outright.
    pub async fn new(
        directory: &dyn RoleDirectory,
        principal: PrincipalId,
    ) -> Result<Self, ResolverError> {
        let names = directory.principal_roles(principal).await?;
        if names.is_empty() {
            return Err(ResolverError::NotPermitted);
        }

        let mut roles = Vec::with_capacity(names.len());
        for name in &names {
            match directory.role(name).await? {
                Some(role) => roles.push(role),
                None => {
                    tracing::warn!(%principal, role = %name, "skipping unresolvable role");
                }
            }
        }

        Ok(Self { principal, roles })
    }

    pub fn principal(&self) -> PrincipalId {
        self.principal
    }

    /// True when any resolved role grants `accession`.
    pub fn has(&self, accession: Accession) -> bool {
        self.roles.iter().any(|role| role.grants(accession))
    }

    /// True when at least one of `required` is granted. OR semantics
    /// only; callers wanting all-of compose multiple checks themselves.
    pub fn require(&self, required: &[Accession]) -> bool {
        required.iter().any(|accession| self.has(*accession))
    }

    /// Union of everything the resolved roles grant, for introspection.
    pub fn effective_accessions(&self) -> Vec<Accession> {
        Accession::ALL
            .into_iter()
            .filter(|accession| self.has(*accession))
            .collect()
    }
}

/// In-memory [`RoleDirectory`] for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    assignments: RwLock<HashMap<PrincipalId, Vec<String>>>,
    roles: RwLock<HashMap<String, Role>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-seeded with the built-in user role.
    pub fn with_default_roles() -> Self {
        let directory = Self::new();
        let _ = directory.insert_role(Role::default_user());
        directory
    }

    pub fn insert_role(&self, role: Role) -> Result<(), DirectoryError> {
        let mut roles = self.roles.write().map_err(|_| Self::poisoned())?;
        roles.insert(role.name.clone(), role);
        Ok(())
    }

    pub fn assign(
        &self,
        principal: PrincipalId,
        role_names: Vec<String>,
    ) -> Result<(), DirectoryError> {
        let mut assignments = self.assignments.write().map_err(|_| Self::poisoned())?;
        assignments.insert(principal, role_names);
        Ok(())
    }

    fn poisoned() -> DirectoryError {
        DirectoryError::Unavailable("directory lock poisoned".to_string())
    }
}

#[async_trait]
impl RoleDirectory for MemoryDirectory {
    async fn principal_roles(
        &self,
        principal: PrincipalId,
    ) -> Result<Vec<String>, DirectoryError> {
        let assignments = self.assignments.read().map_err(|_| Self::poisoned())?;
        match assignments.get(&principal) {
            Some(names) => Ok(names.clone()),
            None => Err(DirectoryError::PrincipalNotFound),
        }
    }

    async fn role(&self, name: &str) -> Result<Option<Role>, DirectoryError> {
        let roles = self.roles.read().map_err(|_| Self::poisoned())?;
        Ok(roles.get(name).cloned())
    }
}
