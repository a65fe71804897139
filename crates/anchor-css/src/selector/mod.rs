//! CSS Selector parsing and matching
//!
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/), restricted to what
//! anchor resolution needs: type, class, id, universal and attribute
//! selectors, the four combinators, a few structural pseudo-classes, the
//! logical `:not()`/`:is()`/`:where()`, and a trailing `::before`/`::after`.
//! Dynamic pseudo-classes (`:hover`, ...) never match.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

use anchor_dom::{DomTree, ElementData, NodeId, NodeType};
use serde::Serialize;

/// [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
///
/// The two pseudo-elements that can act as anchors or positioned boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PseudoElement {
    /// `::before`
    #[serde(rename = "::before")]
    Before,
    /// `::after`
    #[serde(rename = "::after")]
    After,
}

impl PseudoElement {
    /// Canonical `::name` spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "::before",
            Self::After => "::after",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            _ => None,
        }
    }
}

/// Split a trailing `::before`/`::after` (or legacy single-colon form) off a
/// selector. A pseudo-element with no compound before it applies to `*`.
///
/// ```ignore
/// assert_eq!(split_pseudo_element("#a::before"), ("#a".into(), Some(PseudoElement::Before)));
/// assert_eq!(split_pseudo_element(".x ::after"), (".x *".into(), Some(PseudoElement::After)));
/// ```
#[must_use]
pub fn split_pseudo_element(selector: &str) -> (Cow<'_, str>, Option<PseudoElement>) {
    let trimmed = selector.trim();
    let Some(colon) = trimmed.rfind(':') else {
        return (Cow::Borrowed(trimmed), None);
    };
    let Some(pseudo) = PseudoElement::from_name(&trimmed[colon + 1..]) else {
        return (Cow::Borrowed(trimmed), None);
    };
    let head = trimmed[..colon].strip_suffix(':').unwrap_or(&trimmed[..colon]);
    let head = if head.is_empty() {
        Cow::Borrowed("*")
    } else if head.ends_with(|c: char| c.is_ascii_whitespace() || matches!(c, '>' | '+' | '~')) {
        Cow::Owned(format!("{head}*"))
    } else {
        Cow::Borrowed(head)
    };
    (head, Some(pseudo))
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
///
/// A single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    Type(String),
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,
    /// Dynamic or unsupported pseudo-classes. Parsed so the rule survives,
    /// never matched.
    NeverMatch,
    /// A structural pseudo-class.
    PseudoClass(PseudoClass),
    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    Not(Vec<ParsedSelector>),
    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches); `zero_specificity`
    /// marks the `:where()` spelling.
    Is {
        /// Alternatives; any may match.
        selectors: Vec<ParsedSelector>,
        /// True for `:where()`.
        zero_specificity: bool,
    },
}

/// Structural pseudo-classes per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:root`
    Root,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:empty`
    Empty,
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`
    Exists(String),
    /// `[attr=value]`
    Equals(String, String),
    /// `[attr~=value]`
    Includes(String, String),
    /// `[attr|=value]`
    DashMatch(String, String),
    /// `[attr^=value]`
    PrefixMatch(String, String),
    /// `[attr$=value]`
    SuffixMatch(String, String),
    /// `[attr*=value]`
    SubstringMatch(String, String),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// Conditions that must all hold on one element.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: `A B`
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Stored right to left: `A > B C` has subject `C` and combinators
/// `[(Descendant, B), (Child, A)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector.
    pub subject: CompoundSelector,
    /// (combinator, compound) pairs walking left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// (ids, classes/attributes/pseudo-classes, types/pseudo-elements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl std::ops::Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

/// A parsed selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The element-matching part.
    pub complex: ComplexSelector,
    /// Trailing `::before`/`::after`, matched separately.
    pub pseudo_element: Option<PseudoElement>,
    /// Specificity, pseudo-element included.
    pub specificity: Specificity,
}

impl ParsedSelector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Matches the element part against `node_id`; the pseudo-element, if
    /// any, is the caller's concern.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        if !compound_matches(&self.complex.subject, tree, node_id) {
            return false;
        }

        let mut current = node_id;
        for (combinator, compound) in &self.complex.combinators {
            let next = match combinator {
                Combinator::Descendant => tree
                    .ancestors(current)
                    .find(|&id| compound_matches(compound, tree, id)),
                Combinator::Child => tree
                    .parent(current)
                    .filter(|&id| compound_matches(compound, tree, id)),
                Combinator::NextSibling => tree
                    .preceding_siblings(current)
                    .find(|&id| tree.as_element(id).is_some())
                    .filter(|&id| compound_matches(compound, tree, id)),
                Combinator::SubsequentSibling => tree
                    .preceding_siblings(current)
                    .find(|&id| compound_matches(compound, tree, id)),
            };
            match next {
                Some(id) => current = id,
                None => return false,
            }
        }
        true
    }
}

fn compound_matches(compound: &CompoundSelector, tree: &DomTree, node_id: NodeId) -> bool {
    let Some(element) = tree.as_element(node_id) else {
        return false;
    };
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple_matches(simple, tree, node_id, element))
}

fn simple_matches(
    simple: &SimpleSelector,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    match simple {
        SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
        SimpleSelector::Class(class_name) => element.classes().contains(class_name.as_str()),
        SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
        SimpleSelector::Universal => true,
        SimpleSelector::NeverMatch => false,
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(*pc, tree, node_id),
        SimpleSelector::Attribute(attr) => attribute_matches(attr, element),
        SimpleSelector::Not(list) => !list
            .iter()
            .any(|s| s.pseudo_element.is_none() && s.matches_in_tree(tree, node_id)),
        SimpleSelector::Is { selectors, .. } => selectors
            .iter()
            .any(|s| s.pseudo_element.is_none() && s.matches_in_tree(tree, node_id)),
    }
}

fn element_siblings(tree: &DomTree, node_id: NodeId) -> Vec<NodeId> {
    tree.parent(node_id)
        .map(|parent| {
            tree.children(parent)
                .iter()
                .copied()
                .filter(|&c| tree.as_element(c).is_some())
                .collect()
        })
        .unwrap_or_default()
}

fn pseudo_class_matches(pc: PseudoClass, tree: &DomTree, node_id: NodeId) -> bool {
    match pc {
        // "In HTML, this is the html element."
        PseudoClass::Root => tree.document_element() == Some(node_id),
        PseudoClass::FirstChild => element_siblings(tree, node_id).first() == Some(&node_id),
        PseudoClass::LastChild => element_siblings(tree, node_id).last() == Some(&node_id),
        PseudoClass::OnlyChild => element_siblings(tree, node_id) == [node_id],
        PseudoClass::Empty => tree.children(node_id).iter().all(|&c| {
            match tree.get(c).map(|n| &n.node_type) {
                Some(NodeType::Text(t)) => t.is_empty(),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }
        }),
    }
}

fn attribute_matches(attr: &AttributeSelector, element: &ElementData) -> bool {
    let value = |name: &str| element.attrs.get(name).map(String::as_str);
    match attr {
        AttributeSelector::Exists(name) => value(name).is_some(),
        AttributeSelector::Equals(name, val) => value(name) == Some(val.as_str()),
        AttributeSelector::Includes(name, val) => {
            value(name).is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val))
        }
        AttributeSelector::DashMatch(name, val) => value(name).is_some_and(|v| {
            v == val || v.strip_prefix(val.as_str()).is_some_and(|rest| rest.starts_with('-'))
        }),
        AttributeSelector::PrefixMatch(name, val) => {
            value(name).is_some_and(|v| !val.is_empty() && v.starts_with(val.as_str()))
        }
        AttributeSelector::SuffixMatch(name, val) => {
            value(name).is_some_and(|v| !val.is_empty() && v.ends_with(val.as_str()))
        }
        AttributeSelector::SubstringMatch(name, val) => {
            value(name).is_some_and(|v| !val.is_empty() && v.contains(val.as_str()))
        }
    }
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    compound
        .simple_selectors
        .iter()
        .fold(Specificity::default(), |spec, simple| {
            spec + match simple {
                // "count the number of ID selectors in the selector (= A)"
                SimpleSelector::Id(_) => Specificity(1, 0, 0),
                // "count the number of class selectors, attributes selectors,
                // and pseudo-classes in the selector (= B)"
                SimpleSelector::Class(_)
                | SimpleSelector::PseudoClass(_)
                | SimpleSelector::Attribute(_)
                | SimpleSelector::NeverMatch => Specificity(0, 1, 0),
                // "count the number of type selectors and pseudo-elements (= C)"
                SimpleSelector::Type(_) => Specificity(0, 0, 1),
                SimpleSelector::Universal => Specificity::default(),
                // "The specificity of an :is(), :not(), or :has() pseudo-class
                // is replaced by the specificity of the most specific complex
                // selector in its selector list argument."
                SimpleSelector::Not(list)
                | SimpleSelector::Is {
                    selectors: list,
                    zero_specificity: false,
                } => list
                    .iter()
                    .map(|s| s.specificity)
                    .max()
                    .unwrap_or_default(),
                SimpleSelector::Is { .. } => Specificity::default(),
            }
        })
}

const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// Hand-written cursor over selector text.
struct SelectorParser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl SelectorParser<'_> {
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            let _ = self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_ident_char(c) {
                ident.push(c);
                let _ = self.chars.next();
            } else if c == '\\' {
                // Escaped code point: keep the next char verbatim.
                let _ = self.chars.next();
                if let Some(escaped) = self.chars.next() {
                    ident.push(escaped);
                }
            } else {
                break;
            }
        }
        ident
    }

    /// Text up to the matching `)`, the opening `(` already consumed.
    fn parenthesized(&mut self) -> Option<String> {
        let mut depth = 1u32;
        let mut text = String::new();
        for c in self.chars.by_ref() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(text);
                    }
                }
                _ => {}
            }
            text.push(c);
        }
        None
    }

    fn attribute(&mut self) -> Option<AttributeSelector> {
        let _ = self.skip_whitespace();
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        let _ = self.skip_whitespace();

        let operator = match self.chars.next()? {
            ']' => return Some(AttributeSelector::Exists(name)),
            '=' => '=',
            op @ ('~' | '|' | '^' | '$' | '*') if self.chars.next() == Some('=') => op,
            _ => return None,
        };

        let _ = self.skip_whitespace();
        let value = match self.chars.peek() {
            Some(&quote @ ('"' | '\'')) => {
                let _ = self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next()? {
                        c if c == quote => break,
                        '\\' => value.push(self.chars.next()?),
                        c => value.push(c),
                    }
                }
                value
            }
            _ => self.ident(),
        };

        let _ = self.skip_whitespace();
        // Case-sensitivity flags (`i`/`s`) are accepted and ignored.
        if self.chars.peek().is_some_and(|c| matches!(c, 'i' | 's' | 'I' | 'S')) {
            let _ = self.chars.next();
            let _ = self.skip_whitespace();
        }
        if self.chars.next()? != ']' {
            return None;
        }

        Some(match operator {
            '=' => AttributeSelector::Equals(name, value),
            '~' => AttributeSelector::Includes(name, value),
            '|' => AttributeSelector::DashMatch(name, value),
            '^' => AttributeSelector::PrefixMatch(name, value),
            '$' => AttributeSelector::SuffixMatch(name, value),
            _ => AttributeSelector::SubstringMatch(name, value),
        })
    }

    /// After a `:`; returns the simple selector or the pseudo-element.
    fn pseudo(&mut self) -> Option<Result<SimpleSelector, PseudoElement>> {
        let double = self.chars.peek() == Some(&':');
        if double {
            let _ = self.chars.next();
        }
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        let argument = if self.chars.peek() == Some(&'(') {
            let _ = self.chars.next();
            Some(self.parenthesized()?)
        } else {
            None
        };

        if let Some(pseudo) = PseudoElement::from_name(&name).filter(|_| argument.is_none()) {
            return Some(Err(pseudo));
        }
        if double {
            // Other pseudo-elements have no box we can reason about.
            return Some(Ok(SimpleSelector::NeverMatch));
        }

        let simple = match (name.as_str(), argument) {
            ("root", None) => SimpleSelector::PseudoClass(PseudoClass::Root),
            ("first-child", None) => SimpleSelector::PseudoClass(PseudoClass::FirstChild),
            ("last-child", None) => SimpleSelector::PseudoClass(PseudoClass::LastChild),
            ("only-child", None) => SimpleSelector::PseudoClass(PseudoClass::OnlyChild),
            ("empty", None) => SimpleSelector::PseudoClass(PseudoClass::Empty),
            ("not", Some(list)) => SimpleSelector::Not(parse_selector_list(&list)?),
            ("is" | "matches", Some(list)) => SimpleSelector::Is {
                selectors: parse_selector_list(&list)?,
                zero_specificity: false,
            },
            ("where", Some(list)) => SimpleSelector::Is {
                selectors: parse_selector_list(&list)?,
                zero_specificity: true,
            },
            _ => SimpleSelector::NeverMatch,
        };
        Some(Ok(simple))
    }
}

/// Parse a comma-separated selector list; fails if any member fails.
#[must_use]
pub fn parse_selector_list(raw: &str) -> Option<Vec<ParsedSelector>> {
    split_top_level_commas(raw).into_iter().map(parse_selector).collect()
}

/// Split on commas outside parentheses and brackets.
#[must_use]
pub fn split_top_level_commas(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

/// Parse one complex selector.
///
/// Returns `None` for syntax this module does not understand, which callers
/// treat as "matches nothing".
#[must_use]
pub fn parse_selector(raw: &str) -> Option<ParsedSelector> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut parser = SelectorParser {
        chars: trimmed.chars().peekable(),
    };
    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut current = CompoundSelector::default();
    let mut pseudo_element = None;

    loop {
        let had_space = parser.skip_whitespace();
        let Some(&c) = parser.chars.peek() else {
            break;
        };

        // Anything after a pseudo-element is unsupported.
        if pseudo_element.is_some() {
            return None;
        }

        let explicit = match c {
            '>' => Some(Combinator::Child),
            '+' => Some(Combinator::NextSibling),
            '~' => Some(Combinator::SubsequentSibling),
            _ => None,
        };
        if let Some(combinator) = explicit {
            let _ = parser.chars.next();
            if current.simple_selectors.is_empty() {
                return None;
            }
            compounds.push(std::mem::take(&mut current));
            combinators.push(combinator);
            continue;
        }
        if had_space && !current.simple_selectors.is_empty() {
            compounds.push(std::mem::take(&mut current));
            combinators.push(Combinator::Descendant);
        }

        let _ = parser.chars.next();
        let simple = match c {
            '.' => SimpleSelector::Class(non_empty(parser.ident())?),
            '#' => SimpleSelector::Id(non_empty(parser.ident())?),
            '*' => SimpleSelector::Universal,
            '[' => SimpleSelector::Attribute(parser.attribute()?),
            ':' => match parser.pseudo()? {
                Ok(simple) => simple,
                Err(pseudo) => {
                    pseudo_element = Some(pseudo);
                    continue;
                }
            },
            c if is_ident_start_char(c) || c == '-' => {
                let mut name = String::from(c);
                name.push_str(&parser.ident());
                SimpleSelector::Type(name.to_ascii_lowercase())
            }
            _ => return None,
        };
        current.simple_selectors.push(simple);
    }

    if current.simple_selectors.is_empty() {
        // `a > ::before` means `a > *::before`; a bare dangling combinator fails.
        if pseudo_element.is_none() {
            return None;
        }
        current.simple_selectors.push(SimpleSelector::Universal);
    }

    let mut combined: Vec<(Combinator, CompoundSelector)> =
        combinators.into_iter().zip(compounds).collect();
    combined.reverse();

    let complex = ComplexSelector {
        subject: current,
        combinators: combined,
    };
    let mut specificity = complex
        .combinators
        .iter()
        .fold(compound_specificity(&complex.subject), |spec, (_, c)| {
            spec + compound_specificity(c)
        });
    if pseudo_element.is_some() {
        specificity = specificity + Specificity(0, 0, 1);
    }

    Some(ParsedSelector {
        complex,
        pseudo_element,
        specificity,
    })
}

fn non_empty(ident: String) -> Option<String> {
    (!ident.is_empty()).then_some(ident)
}
