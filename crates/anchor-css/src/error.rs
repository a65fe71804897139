//! Parse errors.

use thiserror::Error;

/// A stylesheet the parser could only recover from by guessing.
///
/// The tolerant entry points ([`crate::parse_css_text`]) recover the way
/// browsers do; [`crate::parse_stylesheet`] reports the first of these
/// instead, so one malformed record can be skipped without losing others.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// End of input inside a `{}` block.
    #[error("unterminated block in `{context}`")]
    UnterminatedBlock {
        /// Prelude of the rule whose block was left open.
        context: String,
    },
    /// A qualified rule whose prelude runs to end of input.
    #[error("rule `{prelude}` has no block")]
    MissingBlock {
        /// The dangling prelude.
        prelude: String,
    },
    /// A `}` with no matching `{` at the top level.
    #[error("unexpected `}}` at top level")]
    UnbalancedBrace,
    /// A string interrupted by a newline.
    #[error("bad string token in `{context}`")]
    BadString {
        /// Declaration or prelude containing the token.
        context: String,
    },
    /// A malformed unquoted `url(...)`.
    #[error("bad url token in `{context}`")]
    BadUrl {
        /// Declaration or prelude containing the token.
        context: String,
    },
}
