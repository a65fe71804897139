//! Generated identifiers.
//!
//! Ids double as custom property names, so every id is a dashed ident.

use std::sync::OnceLock;

/// Number of random characters in a generated id.
const ID_LENGTH: usize = 12;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Source of collision-free identifiers.
pub trait IdGenerator {
    /// A new id starting with `prefix` (itself starting with `--`).
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random ids backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct RandomIds {
    rng: fastrand::Rng,
}

impl RandomIds {
    /// Ids from a randomly seeded generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Reproducible ids.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&mut self, prefix: &str) -> String {
        let suffix: String = (0..ID_LENGTH)
            .map(|_| char::from(ALPHABET[self.rng.usize(..ALPHABET.len())]))
            .collect();
        format!("{prefix}-{suffix}")
    }
}

/// Deterministic ids (`--anchor-1`, `--pa-2`, ...). One counter is shared by
/// every prefix, so ids stay unique across prefixes.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: usize,
}

impl SequentialIds {
    /// Start counting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}-{}", self.next)
    }
}

/// The process-wide instance token used to name shifted custom properties,
/// so independent polyfill instances on one page never collide.
pub fn instance_token() -> &'static str {
    static TOKEN: OnceLock<String> = OnceLock::new();
    TOKEN.get_or_init(|| {
        let mut rng = fastrand::Rng::new();
        (0..ID_LENGTH)
            .map(|_| char::from(ALPHABET[rng.usize(..ALPHABET.len())]))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_unique_across_prefixes() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id("--anchor"), "--anchor-1");
        assert_eq!(ids.next_id("--pa"), "--pa-2");
    }

    #[test]
    fn test_seeded_ids_repeat() {
        let a = RandomIds::with_seed(7).next_id("--anchor");
        let b = RandomIds::with_seed(7).next_id("--anchor");
        assert_eq!(a, b);
        assert_eq!(a.len(), "--anchor-".len() + ID_LENGTH);
    }

    #[test]
    fn test_instance_token_is_stable() {
        assert_eq!(instance_token(), instance_token());
        assert!(instance_token().chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
