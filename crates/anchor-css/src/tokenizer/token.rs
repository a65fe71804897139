//! CSS Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! Tokens serialize back to CSS text through [`fmt::Display`]: the rewriting
//! passes regenerate stylesheet text from the token stream, so `Display`
//! emits CSS rather than a debug rendering.

use core::fmt;

/// "A `<hash-token>` with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// The hash token's value is a valid identifier
    Id,
    /// The hash token's value is not a valid identifier
    Unrestricted,
}

/// "A `<number-token>` has a type flag set to either 'integer' or 'number'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// No decimal point or exponent
    Integer,
    /// Has a decimal point or exponent
    Number,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// One token of the CSS Syntax Level 3 token stream. Unicode-range tokens
/// are not produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CSSToken {
    /// `<ident-token>`
    Ident(String),
    /// `<function-token>`: the name, without the opening parenthesis
    Function(String),
    /// `<at-keyword-token>`: the name, without the `@`
    AtKeyword(String),
    /// `<hash-token>`
    Hash {
        /// Name after the `#`
        value: String,
        /// "a type flag set to either 'id' or 'unrestricted'"
        hash_type: HashType,
    },
    /// `<string-token>`: the unquoted, unescaped contents
    String(String),
    /// `<bad-string-token>`, "represents a parsing error"
    BadString,
    /// `<url-token>`: the contents of an unquoted `url(...)`
    Url(String),
    /// `<bad-url-token>`, "represents a parsing error"
    BadUrl,
    /// `<delim-token>`
    Delim(char),
    /// `<number-token>`
    Number {
        /// Numeric value
        value: f64,
        /// Exact value when the type flag is integer
        int_value: Option<i64>,
        /// Type flag
        numeric_type: NumericType,
    },
    /// `<percentage-token>`
    Percentage {
        /// Numeric value, without the `%`
        value: f64,
        /// Exact value when the type flag is integer
        int_value: Option<i64>,
        /// Type flag
        numeric_type: NumericType,
    },
    /// `<dimension-token>`
    Dimension {
        /// Numeric value
        value: f64,
        /// Exact value when the type flag is integer
        int_value: Option<i64>,
        /// Type flag
        numeric_type: NumericType,
        /// Unit, as written
        unit: String,
    },
    /// `<whitespace-token>`
    Whitespace,
    /// `<CDO-token>` (`<!--`)
    CDO,
    /// `<CDC-token>` (`-->`)
    CDC,
    /// `<colon-token>`
    Colon,
    /// `<semicolon-token>`
    Semicolon,
    /// `<comma-token>`
    Comma,
    /// `<[-token>`
    LeftBracket,
    /// `<]-token>`
    RightBracket,
    /// `<(-token>`
    LeftParen,
    /// `<)-token>`
    RightParen,
    /// `<{-token>`
    LeftBrace,
    /// `<}-token>`
    RightBrace,
    /// End of input
    EOF,
}

impl CSSToken {
    /// Create a new ident token.
    #[must_use]
    pub fn ident(value: impl Into<String>) -> Self {
        Self::Ident(value.into())
    }

    /// Create a new dimension token.
    #[must_use]
    pub fn dimension(value: f64, int_value: Option<i64>, unit: impl Into<String>) -> Self {
        Self::Dimension {
            value,
            int_value,
            numeric_type: if int_value.is_some() {
                NumericType::Integer
            } else {
                NumericType::Number
            },
            unit: unit.into(),
        }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// The ident's value, if this is an `<ident-token>`.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(value) => Some(value),
            _ => None,
        }
    }

    /// Case-insensitive ident comparison.
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        self.as_ident().is_some_and(|v| v.eq_ignore_ascii_case(name))
    }

    /// True for `<bad-string-token>` and `<bad-url-token>`.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::BadString | Self::BadUrl)
    }
}

/// [§ 2.1 Serialize an identifier](https://drafts.csswg.org/cssom/#serialize-an-identifier)
///
/// Escapes anything that is not an ident code point. A leading digit is
/// escaped as a code point so the result re-tokenizes as an ident.
pub fn write_ident(f: &mut impl fmt::Write, ident: &str) -> fmt::Result {
    for (i, c) in ident.chars().enumerate() {
        let is_name = c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii();
        if i == 0 && c.is_ascii_digit() {
            write!(f, "\\{:x} ", c as u32)?;
        } else if is_name {
            f.write_char(c)?;
        } else {
            write!(f, "\\{c}")?;
        }
    }
    Ok(())
}

fn write_number(f: &mut fmt::Formatter<'_>, value: f64, int_value: Option<i64>) -> fmt::Result {
    match int_value {
        Some(v) => write!(f, "{v}"),
        None => write!(f, "{value}"),
    }
}

impl fmt::Display for CSSToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write_ident(f, v),
            Self::Function(v) => {
                write_ident(f, v)?;
                f.write_str("(")
            }
            Self::AtKeyword(v) => {
                f.write_str("@")?;
                write_ident(f, v)
            }
            Self::Hash { value, .. } => {
                f.write_str("#")?;
                write_ident(f, value)
            }
            Self::String(v) => {
                f.write_str("\"")?;
                for c in v.chars() {
                    match c {
                        '"' | '\\' => write!(f, "\\{c}")?,
                        '\n' => f.write_str("\\a ")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Self::Url(v) => write!(f, "url({v})"),
            // Bad tokens have no faithful serialization; emit something the
            // tokenizer will reject again.
            Self::BadString => f.write_str("\"\n"),
            Self::BadUrl => f.write_str("url(\"\")"),
            Self::Delim(c) => write!(f, "{c}"),
            Self::Number {
                value, int_value, ..
            } => write_number(f, *value, *int_value),
            Self::Percentage {
                value, int_value, ..
            } => {
                write_number(f, *value, *int_value)?;
                f.write_str("%")
            }
            Self::Dimension {
                value,
                int_value,
                unit,
                ..
            } => {
                write_number(f, *value, *int_value)?;
                write_ident(f, unit)
            }
            Self::Whitespace => f.write_str(" "),
            Self::CDO => f.write_str("<!--"),
            Self::CDC => f.write_str("-->"),
            Self::Colon => f.write_str(":"),
            Self::Semicolon => f.write_str(";"),
            Self::Comma => f.write_str(","),
            Self::LeftBracket => f.write_str("["),
            Self::RightBracket => f.write_str("]"),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
            Self::LeftBrace => f.write_str("{"),
            Self::RightBrace => f.write_str("}"),
            Self::EOF => Ok(()),
        }
    }
}
