use serde::{Deserialize, Serialize};

use crate::Accession;

/// A named accession bundle, looked up by name through a role directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub accessions: Vec<Accession>,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        accessions: Vec<Accession>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            accessions,
        }
    }

    /// The built-in role every ordinary account starts with.
    pub fn default_user() -> Self {
        Self::new(
            "user",
            "standard user account",
            Accession::ALL.to_vec(),
        )
    }

    pub fn grants(&self, accession: Accession) -> bool {
        self.accessions.contains(&accession)
    }
}
