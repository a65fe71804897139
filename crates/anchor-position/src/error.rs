//! Engine errors.

use anchor_css::ParseError;
use thiserror::Error;

/// Failures that stop one style record from being processed.
///
/// Resolution misses are not errors: they surface as an absent anchor
/// element in the output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolyfillError {
    /// A style record's CSS could not be parsed. The record is left untouched
    /// and the others are still processed.
    #[error("failed to parse {origin}: {error}")]
    Parse {
        /// Human-readable record origin (`<style>`, a link href, ...).
        origin: String,
        /// The parser's error.
        error: ParseError,
    },
}
