//! CSS tokenizer module.

/// CSS token types and their serialization.
pub mod token;
/// CSS tokenizer implementation.
pub mod tokenizer;

pub use token::{CSSToken, HashType, NumericType};
pub use tokenizer::CSSTokenizer;
