//! CSS Parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "The input to the parsing stage is a stream of tokens from the tokenization
//! stage."
//!
//! The tree keeps every component value of declarations and preludes, so a
//! parsed stylesheet can be rewritten and serialized back to text. At-rule
//! blocks are parsed according to what they contain: grouping rules
//! (`@media`, `@supports`, `@layer`, ...) hold nested rules, descriptor rules
//! (`@position-try`, `@font-face`, ...) hold declarations, anything else is
//! kept as raw component values.

use crate::error::ParseError;
use crate::selector::{PseudoElement, split_pseudo_element};
use crate::serializer::serialize_values;
use crate::tokenizer::CSSToken;

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// A CSS declaration (e.g., `top: anchor(--btn bottom)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name. Lowercased unless it is a custom property.
    pub name: String,
    /// The value as component values, without surrounding whitespace and
    /// without the `!important` annotation.
    pub value: Vec<ComponentValue>,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

impl Declaration {
    /// A declaration with a pre-parsed value.
    pub fn new(name: impl Into<String>, value: Vec<ComponentValue>) -> Self {
        Self {
            name: name.into(),
            value,
            important: false,
        }
    }

    /// True when the property is a custom property (`--*`).
    #[must_use]
    pub fn is_custom_property(&self) -> bool {
        self.name.starts_with("--")
    }

    /// The value serialized back to CSS text.
    #[must_use]
    pub fn value_text(&self) -> String {
        serialize_values(&self.value)
    }
}

/// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A preserved token.
    Token(CSSToken),
    /// A function with its contents.
    Function {
        /// The function name.
        name: String,
        /// The function arguments, commas and whitespace included.
        value: Vec<ComponentValue>,
    },
    /// A simple block.
    Block {
        /// The opening token character.
        token: char,
        /// The block contents.
        value: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    /// An ident token.
    pub fn ident(value: impl Into<String>) -> Self {
        Self::Token(CSSToken::ident(value))
    }

    /// `var(<name>)`.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Function {
            name: "var".to_string(),
            value: vec![Self::ident(name)],
        }
    }

    /// The ident's value, if this is an ident token.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Token(token) => token.as_ident(),
            _ => None,
        }
    }

    /// True for a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Token(CSSToken::Whitespace))
    }

    /// True for a comma token.
    #[must_use]
    pub const fn is_comma(&self) -> bool {
        matches!(self, Self::Token(CSSToken::Comma))
    }

    /// True when this is a call to `name()`, ASCII case-insensitively.
    #[must_use]
    pub fn is_function(&self, name: &str) -> bool {
        matches!(self, Self::Function { name: n, .. } if n.eq_ignore_ascii_case(name))
    }

    /// For `var(--x, ...)`, the referenced custom property name.
    #[must_use]
    pub fn var_name(&self) -> Option<&str> {
        match self {
            Self::Function { name, value } if name.eq_ignore_ascii_case("var") => value
                .iter()
                .find(|cv| !cv.is_whitespace())
                .and_then(Self::as_ident)
                .filter(|ident| ident.starts_with("--")),
            _ => None,
        }
    }
}

/// One complex selector of a rule's selector list.
///
/// Anchor positioning treats `::before`/`::after` specially, so the
/// pseudo-element is split off up front: `element_part` is what can be
/// matched against elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector {
    /// Full selector text, as serialized.
    pub text: String,
    /// The selector without a trailing `::before`/`::after`.
    pub element_part: String,
    /// The trailing `::before`/`::after`, if any.
    pub pseudo_element: Option<PseudoElement>,
}

impl Selector {
    /// Decompose selector text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let text = text.trim();
        let (element_part, pseudo_element) = split_pseudo_element(text);
        Self {
            text: text.to_string(),
            element_part: element_part.into_owned(),
            pseudo_element,
        }
    }
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
///
/// A style rule (selector list + declarations).
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// The comma-separated selector list.
    pub selectors: Vec<Selector>,
    /// The declarations in this rule block.
    pub declarations: Vec<Declaration>,
}

/// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// The at-keyword name (without the `@`), lowercased.
    pub name: String,
    /// The prelude component values.
    pub prelude: Vec<ComponentValue>,
    /// The block, absent for statement at-rules like `@import`.
    pub block: Option<AtRuleBlock>,
}

impl AtRule {
    /// The prelude serialized and trimmed, e.g. `--flip` for
    /// `@position-try --flip { ... }`.
    #[must_use]
    pub fn prelude_text(&self) -> String {
        serialize_values(&self.prelude).trim().to_string()
    }
}

/// The contents of an at-rule's `{}` block.
#[derive(Debug, Clone, PartialEq)]
pub enum AtRuleBlock {
    /// Grouping rules: `@media`, `@supports`, `@layer`, `@container`, ...
    Rules(Vec<Rule>),
    /// Descriptor blocks: `@position-try`, `@font-face`, `@property`, ...
    Declarations(Vec<Declaration>),
    /// Anything else (`@keyframes`, unknown at-rules), kept verbatim.
    Raw(Vec<ComponentValue>),
}

/// A stylesheet rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A style rule (qualified rule).
    Style(StyleRule),
    /// An at-rule.
    At(AtRule),
}

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<Rule>,
}

#[derive(Clone, Copy)]
enum BlockContents {
    Rules,
    Declarations,
    Raw,
}

fn block_contents(at_rule_name: &str) -> BlockContents {
    match at_rule_name {
        "media" | "supports" | "layer" | "container" | "scope" | "document"
        | "-moz-document" | "starting-style" => BlockContents::Rules,
        "position-try" | "try" | "font-face" | "page" | "property" | "counter-style"
        | "font-palette-values" | "view-transition" => BlockContents::Declarations,
        _ => BlockContents::Raw,
    }
}

/// CSS parser over a token stream.
///
/// Recovery follows the spec; anything that needed recovery is also recorded
/// in [`CSSParser::errors`].
pub struct CSSParser {
    tokens: Vec<CSSToken>,
    position: usize,
    errors: Vec<ParseError>,
}

impl CSSParser {
    /// Create a new parser from a list of tokens.
    pub const fn new(tokens: Vec<CSSToken>) -> Self {
        Self {
            tokens,
            position: 0,
            errors: Vec::new(),
        }
    }

    /// Errors recovered from so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        Stylesheet {
            rules: self.consume_list_of_rules(true),
        }
    }

    /// [§ 5.3.8 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
    ///
    /// Used for `style` attributes.
    pub fn parse_declaration_list(&mut self) -> Vec<Declaration> {
        self.consume_list_of_declarations()
    }

    /// [§ 5.3.10 Parse a list of component values](https://www.w3.org/TR/css-syntax-3/#parse-list-of-component-values)
    pub fn parse_component_values(&mut self) -> Vec<ComponentValue> {
        let mut values = Vec::new();
        while let Some(value) = self.consume_component_value() {
            values.push(value);
        }
        values
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    ///
    /// Nested lists stop at (without consuming) the closing `}`.
    fn consume_list_of_rules(&mut self, top_level: bool) -> Vec<Rule> {
        let mut rules = Vec::new();

        loop {
            match self.peek() {
                None | Some(CSSToken::EOF) => return rules,
                Some(CSSToken::RightBrace) if !top_level => return rules,
                Some(CSSToken::RightBrace) => {
                    self.errors.push(ParseError::UnbalancedBrace);
                    let _ = self.consume();
                }
                Some(CSSToken::Whitespace | CSSToken::Semicolon) => {
                    let _ = self.consume();
                }
                // "If the top-level flag is set, do nothing."
                Some(CSSToken::CDO | CSSToken::CDC) if top_level => {
                    let _ = self.consume();
                }
                Some(CSSToken::AtKeyword(_)) => {
                    if let Some(at_rule) = self.consume_at_rule() {
                        rules.push(Rule::At(at_rule));
                    }
                }
                Some(_) => {
                    if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(Rule::Style(rule));
                    }
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(&mut self) -> Option<AtRule> {
        let name = match self.consume() {
            Some(CSSToken::AtKeyword(name)) => name.to_ascii_lowercase(),
            _ => return None,
        };

        let mut prelude = Vec::new();
        loop {
            match self.peek() {
                Some(CSSToken::Semicolon) => {
                    let _ = self.consume();
                    break;
                }
                // A `}` ends a statement at-rule inside a block.
                None | Some(CSSToken::EOF | CSSToken::RightBrace) => break,
                Some(CSSToken::LeftBrace) => {
                    let _ = self.consume();
                    let block = match block_contents(&name) {
                        BlockContents::Rules => {
                            AtRuleBlock::Rules(self.consume_list_of_rules(false))
                        }
                        BlockContents::Declarations => {
                            AtRuleBlock::Declarations(self.consume_list_of_declarations())
                        }
                        BlockContents::Raw => AtRuleBlock::Raw(self.consume_until_close_brace()),
                    };
                    let context = format!("@{name} {}", serialize_values(&prelude).trim());
                    self.expect_close_brace(context);
                    self.check_bad_tokens(&prelude, || format!("@{name}"));
                    return Some(AtRule {
                        name,
                        prelude,
                        block: Some(block),
                    });
                }
                Some(_) => {
                    if let Some(value) = self.consume_component_value() {
                        prelude.push(value);
                    }
                }
            }
        }

        self.check_bad_tokens(&prelude, || format!("@{name}"));
        Some(AtRule {
            name,
            prelude,
            block: None,
        })
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self) -> Option<StyleRule> {
        let mut prelude = Vec::new();

        loop {
            match self.peek() {
                // "This is a parse error. Return nothing."
                None | Some(CSSToken::EOF) => {
                    self.errors.push(ParseError::MissingBlock {
                        prelude: serialize_values(&prelude).trim().to_string(),
                    });
                    return None;
                }
                Some(CSSToken::RightBrace) => {
                    self.errors.push(ParseError::MissingBlock {
                        prelude: serialize_values(&prelude).trim().to_string(),
                    });
                    return None;
                }
                Some(CSSToken::LeftBrace) => {
                    let _ = self.consume();
                    let prelude_text = serialize_values(&prelude);
                    self.check_bad_tokens(&prelude, || prelude_text.trim().to_string());
                    let selectors = split_selector_list(&prelude);
                    let declarations = self.consume_list_of_declarations();
                    self.expect_close_brace(prelude_text.trim().to_string());
                    return Some(StyleRule {
                        selectors,
                        declarations,
                    });
                }
                Some(_) => {
                    if let Some(value) = self.consume_component_value() {
                        prelude.push(value);
                    }
                }
            }
        }
    }

    fn expect_close_brace(&mut self, context: String) {
        if self.peek() == Some(&CSSToken::RightBrace) {
            let _ = self.consume();
        } else {
            self.errors.push(ParseError::UnterminatedBlock { context });
        }
    }

    fn consume_until_close_brace(&mut self) -> Vec<ComponentValue> {
        let mut values = Vec::new();
        while !matches!(self.peek(), None | Some(CSSToken::EOF | CSSToken::RightBrace)) {
            if let Some(value) = self.consume_component_value() {
                values.push(value);
            }
        }
        values
    }

    /// [§ 5.4.4 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    ///
    /// Stops at (without consuming) a `}` or EOF. Nested at-rules and nested
    /// style rules are dropped.
    fn consume_list_of_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        loop {
            match self.peek() {
                Some(CSSToken::Whitespace | CSSToken::Semicolon) => {
                    let _ = self.consume();
                }
                None | Some(CSSToken::EOF | CSSToken::RightBrace) => return declarations,
                Some(CSSToken::AtKeyword(_)) => {
                    let _ = self.consume_at_rule();
                }
                Some(CSSToken::Ident(_)) => {
                    if let Some(declaration) = self.consume_declaration() {
                        declarations.push(declaration);
                    }
                }
                // "This is a parse error. [...] consume a component value and
                // throw away the returned value."
                Some(_) => self.skip_invalid_declaration(),
            }
        }
    }

    fn skip_invalid_declaration(&mut self) {
        while !matches!(
            self.peek(),
            None | Some(CSSToken::EOF | CSSToken::Semicolon | CSSToken::RightBrace)
        ) {
            // A nested rule ends at its block.
            if matches!(
                self.consume_component_value(),
                Some(ComponentValue::Block { token: '{', .. })
            ) {
                return;
            }
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    fn consume_declaration(&mut self) -> Option<Declaration> {
        let name = match self.consume() {
            Some(CSSToken::Ident(name)) if name.starts_with("--") => name.clone(),
            Some(CSSToken::Ident(name)) => name.to_ascii_lowercase(),
            _ => return None,
        };

        self.skip_whitespace();
        // "If the next input token is anything other than a <colon-token>,
        // this is a parse error. Return nothing."
        if self.peek() != Some(&CSSToken::Colon) {
            self.skip_invalid_declaration();
            return None;
        }
        let _ = self.consume();
        self.skip_whitespace();

        let mut value = Vec::new();
        while !matches!(
            self.peek(),
            None | Some(CSSToken::EOF | CSSToken::Semicolon | CSSToken::RightBrace)
        ) {
            if let Some(v) = self.consume_component_value() {
                value.push(v);
            }
        }

        self.check_bad_tokens(&value, || name.clone());
        let (value, important) = split_important(value);
        Some(Declaration {
            name,
            value,
            important,
        })
    }

    /// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    fn consume_component_value(&mut self) -> Option<ComponentValue> {
        match self.peek()? {
            CSSToken::EOF => None,
            CSSToken::LeftBrace | CSSToken::LeftBracket | CSSToken::LeftParen => {
                let (token, ending) = match self.consume() {
                    Some(CSSToken::LeftBrace) => ('{', CSSToken::RightBrace),
                    Some(CSSToken::LeftBracket) => ('[', CSSToken::RightBracket),
                    _ => ('(', CSSToken::RightParen),
                };
                let value = self.consume_simple_block(&ending);
                Some(ComponentValue::Block { token, value })
            }
            CSSToken::Function(name) => {
                let name = name.clone();
                let _ = self.consume();
                let value = self.consume_simple_block(&CSSToken::RightParen);
                Some(ComponentValue::Function { name, value })
            }
            _ => self.consume().cloned().map(ComponentValue::Token),
        }
    }

    /// [§ 5.4.8 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    ///
    /// Called after the opening token has been consumed.
    fn consume_simple_block(&mut self, ending: &CSSToken) -> Vec<ComponentValue> {
        let mut value = Vec::new();
        loop {
            match self.peek() {
                Some(token) if token == ending => {
                    let _ = self.consume();
                    return value;
                }
                None | Some(CSSToken::EOF) => return value,
                Some(_) => {
                    if let Some(v) = self.consume_component_value() {
                        value.push(v);
                    }
                }
            }
        }
    }

    fn check_bad_tokens(&mut self, values: &[ComponentValue], context: impl Fn() -> String) {
        match find_bad_token(values) {
            Some(CSSToken::BadString) => self.errors.push(ParseError::BadString {
                context: context(),
            }),
            Some(_) => self.errors.push(ParseError::BadUrl {
                context: context(),
            }),
            None => {}
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(&CSSToken::Whitespace) {
            let _ = self.consume();
        }
    }

    fn consume(&mut self) -> Option<&CSSToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&CSSToken> {
        self.tokens.get(self.position)
    }
}

fn find_bad_token(values: &[ComponentValue]) -> Option<&CSSToken> {
    values.iter().find_map(|cv| match cv {
        ComponentValue::Token(token) if token.is_error() => Some(token),
        ComponentValue::Token(_) => None,
        ComponentValue::Function { value, .. } | ComponentValue::Block { value, .. } => {
            find_bad_token(value)
        }
    })
}

/// [§ 5.1 Selector Lists](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// "A selector list is a comma-separated list of selectors."
fn split_selector_list(prelude: &[ComponentValue]) -> Vec<Selector> {
    prelude
        .split(ComponentValue::is_comma)
        .map(serialize_values)
        .filter(|text| !text.trim().is_empty())
        .map(|text| Selector::new(&text))
        .collect()
}

/// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// "A declaration is important if it has a !important annotation, i.e. if the
/// last two (non-whitespace, non-comment) tokens in its value are a
/// <delim-token> with the value "!" followed by an <ident-token> with a value
/// that is an ASCII case-insensitive match for "important"."
///
/// Returns the value with the annotation and surrounding whitespace removed.
fn split_important(mut value: Vec<ComponentValue>) -> (Vec<ComponentValue>, bool) {
    trim_trailing_whitespace(&mut value);

    let mut important = false;
    if value
        .last()
        .is_some_and(|cv| matches!(cv, ComponentValue::Token(t) if t.is_ident("important")))
    {
        let mut bang = value.len() - 1;
        while bang > 0 && value[bang - 1].is_whitespace() {
            bang -= 1;
        }
        if bang > 0 && value[bang - 1] == ComponentValue::Token(CSSToken::Delim('!')) {
            value.truncate(bang - 1);
            important = true;
        }
    }

    trim_trailing_whitespace(&mut value);
    (value, important)
}

fn trim_trailing_whitespace(value: &mut Vec<ComponentValue>) {
    while value.last().is_some_and(ComponentValue::is_whitespace) {
        let _ = value.pop();
    }
}
