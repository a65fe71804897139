//! Tree walks over parsed stylesheets.
//!
//! Every declaration callback receives a [`WalkContext`] naming the rule it
//! sits in and the grouping at-rules around that rule, so callers never
//! reconstruct context from parent pointers.

use crate::parser::{AtRule, AtRuleBlock, ComponentValue, Declaration, Rule, Selector, StyleRule, Stylesheet};

/// The rule that owns a declaration block.
#[derive(Debug, Clone, Copy)]
pub enum RuleRef<'a> {
    /// A style rule and its selector list.
    Style {
        /// The rule's selectors.
        selectors: &'a [Selector],
    },
    /// A descriptor at-rule such as `@position-try --name`.
    At {
        /// Lowercased at-keyword name.
        name: &'a str,
        /// The prelude.
        prelude: &'a [ComponentValue],
    },
}

impl<'a> RuleRef<'a> {
    /// The selectors when this is a style rule.
    #[must_use]
    pub const fn selectors(self) -> Option<&'a [Selector]> {
        match self {
            Self::Style { selectors } => Some(selectors),
            Self::At { .. } => None,
        }
    }
}

/// Where a declaration lives.
#[derive(Debug)]
pub struct WalkContext<'a> {
    /// The owning rule.
    pub rule: RuleRef<'a>,
    /// Enclosing grouping rules, outermost first, as `@name prelude`.
    pub conditions: &'a [String],
    /// Index of the declaration within its block, before any insertion.
    pub index: usize,
    inserted: Vec<Declaration>,
}

impl<'a> WalkContext<'a> {
    /// A context for a declaration; mostly useful in tests.
    #[must_use]
    pub const fn new(rule: RuleRef<'a>, conditions: &'a [String], index: usize) -> Self {
        Self {
            rule,
            conditions,
            index,
            inserted: Vec::new(),
        }
    }

    /// Queue a sibling declaration to be inserted right after the current
    /// one. Inserted declarations are not visited.
    pub fn insert_after(&mut self, declaration: Declaration) {
        self.inserted.push(declaration);
    }
}

/// Visit every declaration in `sheet`, in source order, allowing mutation
/// and sibling insertion. Returns true if anything was inserted.
pub fn walk_declarations_mut(
    sheet: &mut Stylesheet,
    mut visit: impl FnMut(&mut WalkContext<'_>, &mut Declaration),
) -> bool {
    let mut conditions = Vec::new();
    walk_rules_mut(&mut sheet.rules, &mut conditions, &mut visit)
}

fn walk_rules_mut(
    rules: &mut [Rule],
    conditions: &mut Vec<String>,
    visit: &mut impl FnMut(&mut WalkContext<'_>, &mut Declaration),
) -> bool {
    let mut inserted_any = false;
    for rule in rules {
        match rule {
            Rule::Style(StyleRule {
                selectors,
                declarations,
            }) => {
                inserted_any |=
                    walk_block_mut(RuleRef::Style { selectors }, conditions, declarations, visit);
            }
            Rule::At(AtRule {
                name,
                prelude,
                block: Some(AtRuleBlock::Declarations(declarations)),
            }) => {
                let rule = RuleRef::At { name, prelude };
                inserted_any |= walk_block_mut(rule, conditions, declarations, visit);
            }
            Rule::At(at_rule @ AtRule {
                block: Some(AtRuleBlock::Rules(_)),
                ..
            }) => {
                conditions.push(condition_text(at_rule));
                if let Some(AtRuleBlock::Rules(nested)) = &mut at_rule.block {
                    inserted_any |= walk_rules_mut(nested, conditions, visit);
                }
                let _ = conditions.pop();
            }
            Rule::At(_) => {}
        }
    }
    inserted_any
}

fn walk_block_mut(
    rule: RuleRef<'_>,
    conditions: &[String],
    declarations: &mut Vec<Declaration>,
    visit: &mut impl FnMut(&mut WalkContext<'_>, &mut Declaration),
) -> bool {
    let original = std::mem::take(declarations);
    let mut inserted_any = false;
    for (index, mut declaration) in original.into_iter().enumerate() {
        let mut cx = WalkContext::new(rule, conditions, index);
        visit(&mut cx, &mut declaration);
        declarations.push(declaration);
        inserted_any |= !cx.inserted.is_empty();
        declarations.append(&mut cx.inserted);
    }
    inserted_any
}

/// Visit every declaration in `sheet` read-only, in source order.
pub fn for_each_declaration(
    sheet: &Stylesheet,
    mut visit: impl FnMut(&WalkContext<'_>, &Declaration),
) {
    let mut conditions = Vec::new();
    for_each_in_rules(&sheet.rules, &mut conditions, &mut visit);
}

fn for_each_in_rules(
    rules: &[Rule],
    conditions: &mut Vec<String>,
    visit: &mut impl FnMut(&WalkContext<'_>, &Declaration),
) {
    for rule in rules {
        let (rule_ref, declarations) = match rule {
            Rule::Style(style) => (
                RuleRef::Style {
                    selectors: &style.selectors,
                },
                &style.declarations,
            ),
            Rule::At(at_rule) => match &at_rule.block {
                Some(AtRuleBlock::Declarations(declarations)) => (
                    RuleRef::At {
                        name: &at_rule.name,
                        prelude: &at_rule.prelude,
                    },
                    declarations,
                ),
                Some(AtRuleBlock::Rules(nested)) => {
                    conditions.push(condition_text(at_rule));
                    for_each_in_rules(nested, conditions, visit);
                    let _ = conditions.pop();
                    continue;
                }
                Some(AtRuleBlock::Raw(_)) | None => continue,
            },
        };
        for (index, declaration) in declarations.iter().enumerate() {
            visit(&WalkContext::new(rule_ref, conditions, index), declaration);
        }
    }
}

fn condition_text(at_rule: &AtRule) -> String {
    let prelude = at_rule.prelude_text();
    if prelude.is_empty() {
        format!("@{}", at_rule.name)
    } else {
        format!("@{} {prelude}", at_rule.name)
    }
}

/// Every style rule, nested ones included, in source order.
#[must_use]
pub fn style_rules(sheet: &Stylesheet) -> Vec<&StyleRule> {
    fn collect<'a>(rules: &'a [Rule], out: &mut Vec<&'a StyleRule>) {
        for rule in rules {
            match rule {
                Rule::Style(style) => out.push(style),
                Rule::At(AtRule {
                    block: Some(AtRuleBlock::Rules(nested)),
                    ..
                }) => collect(nested, out),
                Rule::At(_) => {}
            }
        }
    }
    let mut out = Vec::new();
    collect(&sheet.rules, &mut out);
    out
}

/// Every at-rule with a declaration block (`@position-try`, `@font-face`, ...),
/// nested ones included, in source order.
#[must_use]
pub fn descriptor_rules(sheet: &Stylesheet) -> Vec<(&AtRule, &[Declaration])> {
    fn collect<'a>(rules: &'a [Rule], out: &mut Vec<(&'a AtRule, &'a [Declaration])>) {
        for rule in rules {
            if let Rule::At(at_rule) = rule {
                match &at_rule.block {
                    Some(AtRuleBlock::Declarations(declarations)) => {
                        out.push((at_rule, declarations.as_slice()));
                    }
                    Some(AtRuleBlock::Rules(nested)) => collect(nested, out),
                    _ => {}
                }
            }
        }
    }
    let mut out = Vec::new();
    collect(&sheet.rules, &mut out);
    out
}

/// Whether [`walk_values_mut`] should look inside a node it just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    /// Visit the node's children too.
    Children,
    /// Leave the children alone, e.g. after replacing the node.
    Skip,
}

/// Pre-order walk over a component value tree, allowing replacement.
pub fn walk_values_mut(
    values: &mut [ComponentValue],
    visit: &mut impl FnMut(&mut ComponentValue) -> Descend,
) {
    for value in values {
        if visit(value) == Descend::Skip {
            continue;
        }
        match value {
            ComponentValue::Function { value: inner, .. }
            | ComponentValue::Block { value: inner, .. } => walk_values_mut(inner, visit),
            ComponentValue::Token(_) => {}
        }
    }
}

/// Pre-order read-only walk over a component value tree.
pub fn visit_values(values: &[ComponentValue], visit: &mut impl FnMut(&ComponentValue)) {
    for value in values {
        visit(value);
        match value {
            ComponentValue::Function { value: inner, .. }
            | ComponentValue::Block { value: inner, .. } => visit_values(inner, visit),
            ComponentValue::Token(_) => {}
        }
    }
}

/// Split top-level values at commas, trimming whitespace around each part.
#[must_use]
pub fn split_commas(values: &[ComponentValue]) -> Vec<&[ComponentValue]> {
    values
        .split(ComponentValue::is_comma)
        .map(trim_whitespace)
        .collect()
}

/// The slice without leading and trailing whitespace tokens.
#[must_use]
pub fn trim_whitespace(values: &[ComponentValue]) -> &[ComponentValue] {
    let start = values
        .iter()
        .position(|cv| !cv.is_whitespace())
        .unwrap_or(values.len());
    let end = values
        .iter()
        .rposition(|cv| !cv.is_whitespace())
        .map_or(start, |i| i + 1);
    &values[start..end]
}

/// The non-whitespace top-level values.
#[must_use]
pub fn significant(values: &[ComponentValue]) -> Vec<&ComponentValue> {
    values.iter().filter(|cv| !cv.is_whitespace()).collect()
}
