use serde::{Deserialize, Serialize};

/// A grantable operation on the protected surface.
///
/// Accessions form a closed set. Role records held outside the process
/// refer to them by name, and stored names that no longer exist here are
/// dropped during normalization rather than treated as errors, so a code
/// change can retire an accession without breaking persisted roles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accession {
    #[serde(rename = "profile.update")]
    ProfileUpdate,
    #[serde(rename = "password.update")]
    PasswordUpdate,
    #[serde(rename = "pay_password.set")]
    PayPasswordSet,
    #[serde(rename = "pay_password.update")]
    PayPasswordUpdate,
    #[serde(rename = "pay_password.reset")]
    PayPasswordReset,
    #[serde(rename = "transfer.do")]
    DoTransfer,
}

impl Accession {
    pub const ALL: [Accession; 6] = [
        Accession::ProfileUpdate,
        Accession::PasswordUpdate,
        Accession::PayPasswordSet,
        Accession::PayPasswordUpdate,
        Accession::PayPasswordReset,
        Accession::DoTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Accession::ProfileUpdate => "profile.update",
            Accession::PasswordUpdate => "password.update",
            Accession::PayPasswordSet => "pay_password.set",
            Accession::PayPasswordUpdate => "pay_password.update",
            Accession::PayPasswordReset => "pay_password.reset",
            Accession::DoTransfer => "transfer.do",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == name)
    }

    /// Map stored names onto the current set, silently dropping the rest.
    pub fn normalize<S: AsRef<str>>(names: &[S]) -> Vec<Accession> {
        names
            .iter()
            .filter_map(|name| Self::from_name(name.as_ref()))
            .collect()
    }
}

impl core::fmt::Display for Accession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
