//! Collision probing
//!
//! Walks the candidate sequence `base`, `base1`, `base11`, ... until a
//! free code is found.

use crate::error::{Result, ShortlyError};

/// Character appended to a taken code before retrying
pub const DISAMBIGUATOR: char = '1';

/// Infinite sequence of candidate codes for one base code.
///
/// Every item is one character longer than the previous one, so no
/// candidate repeats.
#[derive(Debug, Clone)]
pub struct Probe {
    next: String,
}

impl Probe {
    pub fn new(base: impl Into<String>) -> Self {
        Self { next: base.into() }
    }
}

impl Iterator for Probe {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.clone();
        self.next.push(DISAMBIGUATOR);
        Some(current)
    }
}

/// Find the first candidate for `base` that `is_taken` rejects.
///
/// Examines at most `max_attempts` candidates.
pub fn resolve_code<F>(base: &str, max_attempts: usize, mut is_taken: F) -> Result<String>
where
    F: FnMut(&str) -> bool,
{
    for (attempt, candidate) in Probe::new(base).take(max_attempts).enumerate() {
        if !is_taken(&candidate) {
            if attempt > 0 {
                tracing::debug!(base, attempt, code = %candidate, "Resolved code collision");
            }
            return Ok(candidate);
        }
    }

    Err(ShortlyError::CodeSpaceExhausted {
        attempts: max_attempts,
    })
}
