//! Professional identity records.

use serde::{Deserialize, Serialize};

use crate::ids::ProfessionalId;

/// Identity and attributes of the provider owning an office.
///
/// Immutable once registered with a network. Every office is owned by
/// exactly one professional and admits at most
/// [`OFFICE_CAPACITY`](crate::office::OFFICE_CAPACITY) active clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    /// Identifier assigned by the roster loader.
    pub id: ProfessionalId,
    /// Full name.
    pub name: String,
    /// Credential held (e.g. "PhD", "LCSW").
    pub credential: String,
    /// Area of specialization.
    pub specialization: String,
    /// Jurisdiction the professional practices in.
    pub jurisdiction: String,
}

impl Professional {
    /// Create a professional record.
    pub fn new(
        id: ProfessionalId,
        name: impl Into<String>,
        credential: impl Into<String>,
        specialization: impl Into<String>,
        jurisdiction: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            credential: credential.into(),
            specialization: specialization.into(),
            jurisdiction: jurisdiction.into(),
        }
    }
}
