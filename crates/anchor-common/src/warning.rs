//! Deduplicated warnings.
//!
//! Unsupported syntax tends to repeat across every rule of a stylesheet, so
//! each distinct message is logged once per process (or until
//! [`clear_warnings`] is called at the start of a new document).

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Log `message` at warn level, once per unique (component, message) pair.
///
/// Returns `true` when the warning was emitted, `false` when it was a repeat.
///
/// # Example
/// ```ignore
/// warn_once("position-try", "unknown @position-try rule --missing");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let first = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first {
        log::warn!(target: "anchor_polyfill", "[{component}] {message}");
    }
    first
}

/// Forget every recorded warning so they can be emitted again.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_dedups_repeats() {
        assert!(warn_once("test-dedup", "only once"));
        assert!(!warn_once("test-dedup", "only once"));
        assert!(warn_once("test-dedup", "a different message"));
    }
}
