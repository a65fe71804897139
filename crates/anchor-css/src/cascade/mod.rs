//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/),
//! narrowed to what anchor resolution reads back: every property is kept as
//! component values, a few are inherited, and `var()` is substituted.

use std::collections::HashMap;

use crate::parser::{Declaration, Stylesheet};
use crate::selector::{ParsedSelector, PseudoElement, Specificity, parse_selector};
use crate::style::ComputedValues;
use crate::style::substitute::{contains_var, resolve_custom_properties, substitute_var};
use crate::ua_stylesheet::ua_stylesheet;
use crate::walk::style_rules;
use anchor_common::warning::warn_once;
use anchor_dom::{DomTree, NodeId, NodeType};

/// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
///
/// The inherited properties this cascade knows about, besides custom
/// properties which always inherit.
const INHERITED_PROPERTIES: &[&str] = &["direction", "writing-mode", "visibility"];

fn is_inherited(name: &str) -> bool {
    name.starts_with("--") || INHERITED_PROPERTIES.contains(&name)
}

/// [§ 6.2 Cascading Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    UserAgent,
    Author,
    /// Author declarations from a `style` attribute.
    Inline,
}

/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// "Origin and Importance": normal UA < normal author < important author <
/// important UA. Inline style sits above its origin's rules.
const fn precedence(origin: Origin, important: bool) -> u8 {
    match (origin, important) {
        (Origin::UserAgent, false) => 0,
        (Origin::Author, false) => 1,
        (Origin::Inline, false) => 2,
        (Origin::Author, true) => 3,
        (Origin::Inline, true) => 4,
        (Origin::UserAgent, true) => 5,
    }
}

/// A selector with its rule, ready to match.
struct CascadeRule<'a> {
    selector: ParsedSelector,
    declarations: &'a [Declaration],
    origin: Origin,
    order: usize,
}

/// A declared value in cascade order.
struct Declared<'a> {
    precedence: u8,
    specificity: Specificity,
    order: usize,
    declaration: &'a Declaration,
}

/// Computed values for every element, plus `::before`/`::after` boxes that
/// some rule styles.
#[derive(Debug, Clone, Default)]
pub struct ComputedStyles {
    elements: HashMap<NodeId, ComputedValues>,
    pseudos: HashMap<(NodeId, PseudoElement), ComputedValues>,
}

impl ComputedStyles {
    /// Computed values of an element.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&ComputedValues> {
        self.elements.get(&node)
    }

    /// Computed values of an element's pseudo-element, if any rule
    /// targets it.
    #[must_use]
    pub fn pseudo(&self, node: NodeId, pseudo: PseudoElement) -> Option<&ComputedValues> {
        self.pseudos.get(&(node, pseudo))
    }

    /// Override the computed values of a node.
    pub fn insert(&mut self, node: NodeId, values: ComputedValues) {
        let _ = self.elements.insert(node, values);
    }

    /// Forget a node's computed values.
    pub fn remove(&mut self, node: NodeId) -> Option<ComputedValues> {
        self.elements.remove(&node)
    }

    /// Number of styled elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when no element has been styled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
/// "The cascade takes an unordered list of declared values for a given property
/// on a given element, sorts them by their declaration's precedence..."
///
/// Compute styles for the entire DOM tree. The UA stylesheet is applied
/// first; `sheets` are author sheets in document order, and each element's
/// `style` attribute is honored.
#[must_use]
pub fn compute_styles(tree: &DomTree, sheets: &[&Stylesheet]) -> ComputedStyles {
    let mut rules = Vec::new();
    collect_rules(ua_stylesheet(), Origin::UserAgent, &mut rules);
    for sheet in sheets {
        collect_rules(sheet, Origin::Author, &mut rules);
    }

    log::debug!("cascading {} rules from {} author sheets", rules.len(), sheets.len());
    let mut styles = ComputedStyles::default();
    compute_node_styles(tree, NodeId::ROOT, &rules, None, &mut styles);
    styles
}

fn collect_rules<'a>(sheet: &'a Stylesheet, origin: Origin, rules: &mut Vec<CascadeRule<'a>>) {
    for style_rule in style_rules(sheet) {
        for selector in &style_rule.selectors {
            let Some(parsed) = parse_selector(&selector.text) else {
                let _ = warn_once(
                    "CSS",
                    &format!("failed to parse selector '{}'", selector.text),
                );
                continue;
            };
            let order = rules.len();
            rules.push(CascadeRule {
                selector: parsed,
                declarations: &style_rule.declarations,
                origin,
                order,
            });
        }
    }
}

fn compute_node_styles(
    tree: &DomTree,
    id: NodeId,
    rules: &[CascadeRule<'_>],
    inherited: Option<&ComputedValues>,
    styles: &mut ComputedStyles,
) {
    let Some(node) = tree.get(id) else { return };

    match &node.node_type {
        NodeType::Element(element) => {
            let inline = element
                .attrs
                .get("style")
                .map(|text| crate::parse_declarations(text))
                .unwrap_or_default();

            let mut declared = matching(rules, tree, id, None);
            declared.extend(inline.iter().enumerate().map(|(order, declaration)| Declared {
                precedence: precedence(Origin::Inline, declaration.important),
                specificity: Specificity::default(),
                order,
                declaration,
            }));
            let computed = compute_values(declared, inherited);

            for pseudo in [PseudoElement::Before, PseudoElement::After] {
                let declared = matching(rules, tree, id, Some(pseudo));
                if !declared.is_empty() {
                    let _ = styles
                        .pseudos
                        .insert((id, pseudo), compute_values(declared, Some(&computed)));
                }
            }

            for &child_id in tree.children(id) {
                compute_node_styles(tree, child_id, rules, Some(&computed), styles);
            }
            let _ = styles.elements.insert(id, computed);
        }
        NodeType::Document => {
            for &child_id in tree.children(id) {
                compute_node_styles(tree, child_id, rules, inherited, styles);
            }
        }
        NodeType::Text(_) | NodeType::Comment(_) => {}
    }
}

/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// Declarations of the rules matching `id` (or its pseudo-element).
fn matching<'a>(
    rules: &[CascadeRule<'a>],
    tree: &DomTree,
    id: NodeId,
    pseudo: Option<PseudoElement>,
) -> Vec<Declared<'a>> {
    rules
        .iter()
        .filter(|rule| rule.selector.pseudo_element == pseudo)
        .filter(|rule| rule.selector.matches_in_tree(tree, id))
        .flat_map(|rule| {
            rule.declarations.iter().map(|declaration| Declared {
                precedence: precedence(rule.origin, declaration.important),
                specificity: rule.selector.specificity,
                order: rule.order,
                declaration,
            })
        })
        .collect()
}

fn compute_values(mut declared: Vec<Declared<'_>>, parent: Option<&ComputedValues>) -> ComputedValues {
    // Stable: declarations of one rule keep their source order.
    declared.sort_by_key(|d| (d.precedence, d.specificity, d.order));

    // [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    let mut computed = ComputedValues::default();
    if let Some(parent) = parent {
        for (name, value) in parent.iter() {
            if is_inherited(name) {
                computed.set(name, value.to_vec());
            }
        }
    }

    for Declared { declaration, .. } in &declared {
        apply_declaration(&mut computed, declaration, parent);
    }

    // [CSS Variables § 2.3](https://www.w3.org/TR/css-variables-1/#cycles)
    let custom = resolve_custom_properties(&computed.custom_properties());
    let names: Vec<String> = computed.iter().map(|(name, _)| name.to_string()).collect();
    for name in names {
        if name.starts_with("--") {
            match custom.get(&name) {
                Some(value) => computed.set(&name, value.clone()),
                None => {
                    let _ = computed.remove(&name);
                }
            }
            continue;
        }
        let Some(value) = computed.get(&name).filter(|v| contains_var(v)) else {
            continue;
        };
        match substitute_var(value, &custom) {
            Some(substituted) => computed.set(&name, substituted),
            // "invalid at computed-value time": behaves as `unset`.
            None => apply_keyword(&mut computed, &name, "unset", parent),
        }
    }

    computed
}

fn apply_declaration(
    computed: &mut ComputedValues,
    declaration: &Declaration,
    parent: Option<&ComputedValues>,
) {
    let keyword = match declaration.value.as_slice() {
        [single] => single.as_ident().map(str::to_ascii_lowercase),
        _ => None,
    };
    match keyword.as_deref() {
        Some(keyword @ ("inherit" | "initial" | "unset" | "revert" | "revert-layer")) => {
            apply_keyword(computed, &declaration.name, keyword, parent);
        }
        _ => computed.set(&declaration.name, declaration.value.clone()),
    }
}

/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
fn apply_keyword(
    computed: &mut ComputedValues,
    name: &str,
    keyword: &str,
    parent: Option<&ComputedValues>,
) {
    let inherit = match keyword {
        "inherit" => true,
        "initial" => false,
        // "unset": inherited properties inherit, others are initial.
        // `revert` rolls back to the UA origin; treated the same.
        _ => is_inherited(name),
    };
    match parent.and_then(|p| p.get(name)).filter(|_| inherit) {
        Some(value) => computed.set(name, value.to_vec()),
        None => {
            let _ = computed.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_css_text;
    use anchor_dom::ElementData;

    fn element(tree: &mut DomTree, parent: NodeId, tag: &str, id: Option<&str>) -> NodeId {
        let mut data = ElementData::new(tag);
        if let Some(id) = id {
            data = data.with_attr("id", id);
        }
        tree.append_element(parent, data)
    }

    #[test]
    fn test_specificity_and_order() {
        let sheet = parse_css_text("#a { position: absolute } div { position: relative }");
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, "div", Some("a"));
        let styles = compute_styles(&tree, &[&sheet]);
        assert_eq!(styles.get(a).and_then(|s| s.keyword("position")).as_deref(), Some("absolute"));
    }

    #[test]
    fn test_ua_display_applies() {
        let sheet = parse_css_text("");
        let mut tree = DomTree::new();
        let div = element(&mut tree, NodeId::ROOT, "div", None);
        let span = element(&mut tree, div, "span", None);
        let styles = compute_styles(&tree, &[&sheet]);
        assert!(styles.get(div).is_some_and(ComputedValues::is_block_level));
        assert!(!styles.get(span).is_some_and(ComputedValues::is_block_level));
    }

    #[test]
    fn test_custom_property_inherits_and_substitutes() {
        let sheet = parse_css_text(
            "body { --anchor: --btn; direction: rtl } p { position-anchor: var(--anchor) }",
        );
        let mut tree = DomTree::new();
        let body = element(&mut tree, NodeId::ROOT, "body", None);
        let p = element(&mut tree, body, "p", None);
        let styles = compute_styles(&tree, &[&sheet]);
        let p_style = styles.get(p);
        assert_eq!(p_style.and_then(|s| s.text("--anchor")).as_deref(), Some("--btn"));
        assert_eq!(p_style.and_then(|s| s.text("position-anchor")).as_deref(), Some("--btn"));
        assert_eq!(p_style.and_then(|s| s.text("direction")).as_deref(), Some("rtl"));
    }

    #[test]
    fn test_inline_style_beats_id_rule() {
        let sheet = parse_css_text("#a { position: absolute }");
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, "div", Some("a"));
        let _ = tree.set_attribute(a, "style", "position: fixed");
        let styles = compute_styles(&tree, &[&sheet]);
        assert_eq!(styles.get(a).and_then(|s| s.keyword("position")).as_deref(), Some("fixed"));
    }

    #[test]
    fn test_important_beats_inline() {
        let sheet = parse_css_text("div { position: absolute !important }");
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, "div", None);
        let _ = tree.set_attribute(a, "style", "position: fixed");
        let styles = compute_styles(&tree, &[&sheet]);
        assert_eq!(styles.get(a).and_then(|s| s.keyword("position")).as_deref(), Some("absolute"));
    }

    #[test]
    fn test_pseudo_element_styles() {
        let sheet = parse_css_text("#a::before { content: ''; anchor-name: --pseudo }");
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, "div", Some("a"));
        let styles = compute_styles(&tree, &[&sheet]);
        let before = styles.pseudo(a, PseudoElement::Before);
        assert_eq!(before.and_then(|s| s.text("anchor-name")).as_deref(), Some("--pseudo"));
        assert!(styles.pseudo(a, PseudoElement::After).is_none());
        assert!(styles.get(a).and_then(|s| s.get("anchor-name")).is_none());
    }

    #[test]
    fn test_rules_inside_media_apply() {
        let sheet = parse_css_text("@media screen { #a { position: fixed } }");
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, "div", Some("a"));
        let styles = compute_styles(&tree, &[&sheet]);
        assert_eq!(styles.get(a).and_then(|s| s.keyword("position")).as_deref(), Some("fixed"));
    }
}
