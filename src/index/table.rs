//! MappingIndex implementation
//!
//! Two maps kept in lockstep.

use std::collections::{BTreeMap, HashMap};

use super::InsertOutcome;
use crate::record::Mapping;

/// Forward and reverse index over the mapping relation
///
/// Invariant: `forward[c] == u` if and only if `reverse[u] == c`.
#[derive(Debug, Default, Clone)]
pub struct MappingIndex {
    forward: BTreeMap<String, String>,
    reverse: HashMap<String, String>,
}

impl MappingIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Long URL for a short code
    pub fn url_for(&self, short_code: &str) -> Option<&str> {
        self.forward.get(short_code).map(String::as_str)
    }

    /// Short code for a long URL
    pub fn code_for(&self, long_url: &str) -> Option<&str> {
        self.reverse.get(long_url).map(String::as_str)
    }

    pub fn contains_code(&self, short_code: &str) -> bool {
        self.forward.contains_key(short_code)
    }

    pub fn contains_url(&self, long_url: &str) -> bool {
        self.reverse.contains_key(long_url)
    }

    /// Insert a pair, refusing anything that would break the bijection
    pub fn insert(&mut self, mapping: Mapping) -> InsertOutcome {
        if let Some(existing_url) = self.forward.get(&mapping.short_code) {
            return if *existing_url == mapping.long_url {
                InsertOutcome::AlreadyPresent
            } else {
                InsertOutcome::CodeConflict {
                    existing_url: existing_url.clone(),
                }
            };
        }

        // Code is free, so a reverse hit is necessarily a different code
        if let Some(existing_code) = self.reverse.get(&mapping.long_url) {
            return InsertOutcome::UrlConflict {
                existing_code: existing_code.clone(),
            };
        }

        self.reverse
            .insert(mapping.long_url.clone(), mapping.short_code.clone());
        self.forward.insert(mapping.short_code, mapping.long_url);
        InsertOutcome::Inserted
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterate pairs in ascending code order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward
            .iter()
            .map(|(code, url)| (code.as_str(), url.as_str()))
    }

    /// Owned snapshot of all pairs in ascending code order
    pub fn to_records(&self) -> Vec<Mapping> {
        self.iter()
            .map(|(code, url)| Mapping::new(code, url))
            .collect()
    }
}
