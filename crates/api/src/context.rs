use latchkey_auth::{PrincipalId, PrincipalKind};

/// Authenticated identity for a request.
///
/// Inserted by the authentication stage and read by everything behind it.
/// Roles are deliberately absent: the permission stage resolves them fresh
/// against the directory, so a long-lived request never acts on stale grants.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    kind: PrincipalKind,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, kind: PrincipalKind) -> Self {
        Self { principal_id, kind }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }
}
