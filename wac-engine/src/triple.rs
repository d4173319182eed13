//! RDF triple and keyed triple-set types
//!
//! ACL documents only ever bind IRI terms (authorization subjects, agents,
//! modes, resources), so triples here carry plain expanded IRIs with no
//! literal or blank-node variants.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single RDF triple with all terms as expanded IRIs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject IRI
    pub subject: String,
    /// Predicate IRI
    pub predicate: String,
    /// Object IRI
    pub object: String,
}

impl Triple {
    /// Create a triple from its three terms
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Insertion-ordered set of triples keyed by `(subject, predicate, object)`
///
/// Duplicate checks are O(1); iteration preserves first-insert order so the
/// patches built from a set are deterministic.
#[derive(Debug, Default)]
pub struct TripleSet {
    seen: HashSet<Triple>,
    ordered: Vec<Triple>,
}

impl TripleSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple; returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.insert(triple.clone()) {
            self.ordered.push(triple);
            true
        } else {
            false
        }
    }

    /// Check membership
    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    /// Number of distinct triples
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// True if the set holds no triples
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// The triples in first-insert order
    pub fn as_slice(&self) -> &[Triple] {
        &self.ordered
    }

    /// Consume the set, yielding the triples in first-insert order
    pub fn into_vec(self) -> Vec<Triple> {
        self.ordered
    }
}
