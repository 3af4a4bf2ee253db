//! CSV-backed roster and record persistence.
//!
//! ## Responsibilities
//!
//! - Load the professional roster from a headed CSV file, deduplicating
//!   repeated rows and assigning sequential identifiers in file order
//! - Append client intake records to a separate CSV file
//!
//! ## Design
//!
//! Implements [`RosterStore`] so the core never sees a file format. Rows
//! repeated in the roster (same name and jurisdiction) collapse onto the
//! first occurrence; later rows with conflicting attributes are ignored.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use meridian_core::{ClientProfile, Professional, ProfessionalId, RosterStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One roster row as stored on disk.
#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    credential: String,
    specialization: String,
    jurisdiction: String,
}

/// One client record row as stored on disk.
#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    name: &'a str,
    jurisdiction: &'a str,
    date_of_birth: &'a str,
    language: &'a str,
    email: &'a str,
    phone: &'a str,
}

/// Roster source and record sink backed by two CSV files.
#[derive(Debug, Clone)]
pub struct CsvStore {
    roster_path: PathBuf,
    records_path: PathBuf,
}

impl CsvStore {
    /// Create a store reading the roster from `roster_path` and appending
    /// client records to `records_path`.
    ///
    /// Neither file is touched until [`RosterStore`] methods are called;
    /// the records file is created on first append.
    pub fn new(roster_path: impl Into<PathBuf>, records_path: impl Into<PathBuf>) -> Self {
        Self { roster_path: roster_path.into(), records_path: records_path.into() }
    }

    /// Path the roster is read from.
    pub fn roster_path(&self) -> &Path {
        &self.roster_path
    }

    /// Path client records are appended to.
    pub fn records_path(&self) -> &Path {
        &self.records_path
    }
}

impl RosterStore for CsvStore {
    fn load_roster(&self) -> Result<Vec<Professional>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.roster_path).map_err(csv_error)?;

        let mut roster = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for row in reader.deserialize::<RosterRow>() {
            let row = row.map_err(csv_error)?;
            if !seen.insert((row.name.clone(), row.jurisdiction.clone())) {
                debug!(name = %row.name, jurisdiction = %row.jurisdiction, "skipping duplicate roster row");
                continue;
            }
            let id = ProfessionalId(u32::try_from(roster.len()).map_err(|_| {
                StoreError::Malformed { reason: "roster exceeds id space".to_string() }
            })?);
            roster.push(Professional::new(
                id,
                row.name,
                row.credential,
                row.specialization,
                row.jurisdiction,
            ));
        }

        debug!(count = roster.len(), path = %self.roster_path.display(), "roster loaded");
        Ok(roster)
    }

    fn append_record(&mut self, record: &ClientProfile) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.records_path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        writer
            .serialize(RecordRow {
                name: &record.name,
                jurisdiction: &record.jurisdiction,
                date_of_birth: &record.date_of_birth,
                language: &record.language,
                email: &record.email,
                phone: &record.phone,
            })
            .map_err(csv_error)?;
        writer.flush()?;

        debug!(name = %record.name, path = %self.records_path.display(), "record appended");
        Ok(())
    }
}

/// Preserve i/o failures; everything else is a parse problem.
fn csv_error(err: csv::Error) -> StoreError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => StoreError::Io(io),
            other => StoreError::Malformed { reason: format!("{other:?}") },
        }
    } else {
        StoreError::Malformed { reason: err.to_string() }
    }
}
