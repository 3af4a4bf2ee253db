//! Roster directory: CSV persistence and intake preference filtering.
//!
//! Sits between the on-disk roster and [`meridian_core`]: loads and
//! deduplicates the professional roster, appends client intake records,
//! and narrows the roster by intake preferences through a memoizing
//! decision tree.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod preference;
mod roster;

pub use preference::{Attribute, Preference, PreferenceTree};
pub use roster::CsvStore;
