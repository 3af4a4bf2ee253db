//! Persistence traits for rosters and client records.
//!
//! The core never depends on a file format: it consumes an ordered,
//! deduplicated roster from a [`RosterStore`] and hands client records
//! back through the same trait. `meridian-directory` provides the
//! CSV-backed implementation; [`MemoryStore`] backs tests.

use thiserror::Error;

use crate::{client::ClientProfile, professional::Professional};

/// Errors from roster and record persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be parsed.
    #[error("malformed store data: {reason}")]
    Malformed {
        /// Description of the parse failure.
        reason: String,
    },
}

/// Source of professional rosters and sink for client records.
pub trait RosterStore {
    /// Load the ordered, deduplicated list of professional records.
    fn load_roster(&self) -> Result<Vec<Professional>, StoreError>;

    /// Append a client record to the store.
    fn append_record(&mut self, record: &ClientProfile) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    roster: Vec<Professional>,
    records: Vec<ClientProfile>,
}

impl MemoryStore {
    /// Create a store preloaded with a roster.
    pub fn with_roster(roster: Vec<Professional>) -> Self {
        Self { roster, records: Vec::new() }
    }

    /// Records appended so far, in order.
    pub fn records(&self) -> &[ClientProfile] {
        &self.records
    }
}

impl RosterStore for MemoryStore {
    fn load_roster(&self) -> Result<Vec<Professional>, StoreError> {
        Ok(self.roster.clone())
    }

    fn append_record(&mut self, record: &ClientProfile) -> Result<(), StoreError> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProfessionalId;

    #[test]
    fn memory_store_round_trips_roster() {
        let roster =
            vec![Professional::new(ProfessionalId(0), "Dana Wells", "PhD", "Clinical", "CA")];
        let store = MemoryStore::with_roster(roster.clone());
        assert_eq!(store.load_roster().expect("in-memory load"), roster);
    }

    #[test]
    fn memory_store_appends_records_in_order() {
        let mut store = MemoryStore::default();
        let record = ClientProfile {
            name: "Ada Quinn".to_string(),
            jurisdiction: "ON".to_string(),
            date_of_birth: "04/12/91".to_string(),
            language: "English".to_string(),
            email: "ada.quinn@example.com".to_string(),
            phone: "555-0101".to_string(),
        };

        store.append_record(&record).expect("in-memory append");
        assert_eq!(store.records(), &[record]);
    }
}
