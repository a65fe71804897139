//! CSS tokenizer, parser, serializer, selector matching and a narrow cascade
//! for the anchor positioning polyfill.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//! - **CSS Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)),
//!   keeping nested at-rules and full component values so sheets can be
//!   rewritten
//! - **Serializer** back to compact CSS text
//! - **Walks** over declarations and component values with explicit context
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//! - **CSS Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/)),
//!   enough to read back positioning, display, direction and custom properties
//!
//! # Not Yet Implemented
//!
//! - Media query evaluation (all grouping rules apply)
//! - Cascade layers and `@scope`
//! - CSS nesting

/// CSS cascade and style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Parse errors.
pub mod error;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Serialization per [CSSOM § 6.7](https://www.w3.org/TR/cssom-1/#serializing-css-values).
pub mod serializer;
/// Computed style representation.
pub mod style;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;
/// User-agent stylesheet per [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;
/// Walks over stylesheets and component values.
pub mod walk;

pub use cascade::{ComputedStyles, compute_styles};
pub use error::ParseError;
pub use parser::{
    AtRule, AtRuleBlock, CSSParser, ComponentValue, Declaration, Rule, Selector, StyleRule,
    Stylesheet,
};
pub use selector::{ParsedSelector, PseudoElement, Specificity, parse_selector};
pub use serializer::serialize_values;
pub use style::ComputedValues;
pub use tokenizer::{CSSToken, CSSTokenizer};

fn parser_for(text: &str) -> CSSParser {
    CSSParser::new(CSSTokenizer::tokenize(text))
}

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// Tolerant parse: recovers from every error the way browsers do.
#[must_use]
pub fn parse_css_text(text: &str) -> Stylesheet {
    parser_for(text).parse_stylesheet()
}

/// Strict parse: the stylesheet, or the first error the parser had to
/// recover from.
///
/// # Errors
///
/// Returns the first [`ParseError`] recorded while parsing.
pub fn parse_stylesheet(text: &str) -> Result<Stylesheet, ParseError> {
    let mut parser = parser_for(text);
    let sheet = parser.parse_stylesheet();
    match parser.errors().first() {
        Some(error) => Err(error.clone()),
        None => Ok(sheet),
    }
}

/// [§ 5.3.8 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations),
/// as for a `style` attribute.
#[must_use]
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    parser_for(text).parse_declaration_list()
}

/// [§ 5.3.10 Parse a list of component values](https://www.w3.org/TR/css-syntax-3/#parse-list-of-component-values)
#[must_use]
pub fn parse_component_values(text: &str) -> Vec<ComponentValue> {
    parser_for(text).parse_component_values()
}
