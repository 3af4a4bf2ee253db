//! Preference decision tree over the professional roster.
//!
//! ## Responsibilities
//!
//! - Narrow the roster down to the professionals matching an ordered
//!   sequence of intake preferences
//! - Memoize each explored preference path so repeated queries reuse
//!   already-filtered candidate lists
//!
//! ## Design
//!
//! Each node holds the professionals surviving the choices on the path
//! from the root. Children are created lazily on first descent, keyed by
//! the attribute and the chosen value, so the tree only ever materializes
//! paths that intake queries actually take.

use std::collections::HashMap;

use meridian_core::Professional;
use tracing::debug;

/// Professional attribute an intake preference can select on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Credential held (e.g. "PhD", "LCSW").
    Credential,
    /// Area of specialization.
    Specialization,
    /// Jurisdiction of practice.
    Jurisdiction,
}

/// One intake preference: an attribute and the value it must equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    /// Attribute to match on.
    pub attribute: Attribute,
    /// Required value, compared exactly.
    pub value: String,
}

impl Preference {
    /// Create a preference.
    pub fn new(attribute: Attribute, value: impl Into<String>) -> Self {
        Self { attribute, value: value.into() }
    }

    fn matches(&self, professional: &Professional) -> bool {
        let field = match self.attribute {
            Attribute::Credential => &professional.credential,
            Attribute::Specialization => &professional.specialization,
            Attribute::Jurisdiction => &professional.jurisdiction,
        };
        *field == self.value
    }
}

/// Lazily-built decision tree filtering the roster by intake preferences.
#[derive(Debug, Clone)]
pub struct PreferenceTree {
    professionals: Vec<Professional>,
    subtrees: HashMap<(Attribute, String), PreferenceTree>,
}

impl PreferenceTree {
    /// Root the tree at the full roster.
    pub fn new(roster: Vec<Professional>) -> Self {
        Self { professionals: roster, subtrees: HashMap::new() }
    }

    /// Professionals surviving the choices made so far.
    pub fn candidates(&self) -> &[Professional] {
        &self.professionals
    }

    /// Descend one level, filtering by `preference`.
    ///
    /// The subtree for a given preference is built once and cached;
    /// later descents along the same edge reuse it.
    pub fn descend(&mut self, preference: &Preference) -> &mut PreferenceTree {
        let key = (preference.attribute, preference.value.clone());
        let professionals = &self.professionals;
        self.subtrees.entry(key).or_insert_with(|| {
            let filtered: Vec<Professional> =
                professionals.iter().filter(|p| preference.matches(p)).cloned().collect();
            debug!(
                attribute = ?preference.attribute,
                value = %preference.value,
                remaining = filtered.len(),
                "built preference subtree"
            );
            PreferenceTree { professionals: filtered, subtrees: HashMap::new() }
        })
    }

    /// Apply an ordered sequence of preferences and return the surviving
    /// professionals.
    ///
    /// An empty sequence returns the full roster. Order does not change
    /// the result, only which intermediate subtrees get cached.
    pub fn query(&mut self, preferences: &[Preference]) -> &[Professional] {
        let mut node = self;
        for preference in preferences {
            node = node.descend(preference);
        }
        node.candidates()
    }
}
