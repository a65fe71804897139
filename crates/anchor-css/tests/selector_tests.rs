//! Integration tests for CSS selector parsing and matching.

use anchor_css::selector::{
    AttributeSelector, Combinator, PseudoClass, PseudoElement, SimpleSelector, Specificity,
    parse_selector, split_pseudo_element,
};
use anchor_dom::{DomTree, ElementData, NodeId};

fn make_element(tag: &str, id: Option<&str>, classes: &[&str]) -> ElementData {
    let mut data = ElementData::new(tag);
    if let Some(id_val) = id {
        data = data.with_attr("id", id_val);
    }
    if !classes.is_empty() {
        data = data.with_attr("class", &classes.join(" "));
    }
    data
}

/// `<div id="wrapper"><button id="btn" class="anchor"></button><p></p><div id="popup"></div></div>`
fn sample_tree() -> (DomTree, NodeId, NodeId, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let wrapper = tree.append_element(NodeId::ROOT, make_element("div", Some("wrapper"), &[]));
    let btn = tree.append_element(wrapper, make_element("button", Some("btn"), &["anchor"]));
    let p = tree.append_element(wrapper, make_element("p", None, &[]));
    let popup = tree.append_element(
        wrapper,
        make_element("div", Some("popup"), &[]).with_attr("data-anchor-polyfill", "x1"),
    );
    (tree, wrapper, btn, p, popup)
}

#[test]
fn test_parse_type_selector() {
    let selector = parse_selector("body").unwrap();
    assert_eq!(selector.specificity, Specificity(0, 0, 1));
    assert!(selector.complex.combinators.is_empty());
    assert!(matches!(
        &selector.complex.subject.simple_selectors[0],
        SimpleSelector::Type(name) if name == "body"
    ));
}

#[test]
fn test_parse_compound_specificity() {
    let selector = parse_selector("div#popup.open[data-x]").unwrap();
    assert_eq!(selector.specificity, Specificity(1, 2, 1));
}

#[test]
fn test_parse_combinators_right_to_left() {
    let selector = parse_selector("#wrapper > p + div").unwrap();
    assert_eq!(selector.complex.combinators.len(), 2);
    assert_eq!(selector.complex.combinators[0].0, Combinator::NextSibling);
    assert_eq!(selector.complex.combinators[1].0, Combinator::Child);
}

#[test]
fn test_parse_attribute_selector() {
    let selector = parse_selector(r#"[data-anchor-polyfill="x1"]"#).unwrap();
    assert_eq!(
        selector.complex.subject.simple_selectors[0],
        SimpleSelector::Attribute(AttributeSelector::Equals(
            "data-anchor-polyfill".to_string(),
            "x1".to_string()
        ))
    );
}

#[test]
fn test_parse_pseudo_class() {
    let selector = parse_selector("p:first-child").unwrap();
    assert_eq!(
        selector.complex.subject.simple_selectors[1],
        SimpleSelector::PseudoClass(PseudoClass::FirstChild)
    );
}

#[test]
fn test_parse_pseudo_element() {
    let selector = parse_selector("#btn::before").unwrap();
    assert_eq!(selector.pseudo_element, Some(PseudoElement::Before));
    assert_eq!(selector.specificity, Specificity(1, 0, 1));

    let legacy = parse_selector("#btn:after").unwrap();
    assert_eq!(legacy.pseudo_element, Some(PseudoElement::After));
}

#[test]
fn test_parse_bare_pseudo_element_is_universal() {
    let selector = parse_selector("::before").unwrap();
    assert_eq!(selector.complex.subject.simple_selectors, vec![SimpleSelector::Universal]);
}

#[test]
fn test_parse_rejects_dangling_combinator() {
    assert!(parse_selector("div >").is_none());
    assert!(parse_selector("").is_none());
    assert!(parse_selector("#").is_none());
}

#[test]
fn test_parse_rejects_compound_after_pseudo_element() {
    assert!(parse_selector("#a::before .b").is_none());
}

#[test]
fn test_split_pseudo_element() {
    let split = |text| {
        let (head, pseudo) = split_pseudo_element(text);
        (head.into_owned(), pseudo)
    };
    assert_eq!(split("#a::before"), ("#a".to_string(), Some(PseudoElement::Before)));
    assert_eq!(split(".x :after"), (".x *".to_string(), Some(PseudoElement::After)));
    assert_eq!(split("ul > ::after"), ("ul > *".to_string(), Some(PseudoElement::After)));
    assert_eq!(split("::after"), ("*".to_string(), Some(PseudoElement::After)));
    assert_eq!(split("a:hover"), ("a:hover".to_string(), None));
    assert_eq!(split("p::marker"), ("p::marker".to_string(), None));
}

#[test]
fn test_match_id_class_type() {
    let (tree, _, btn, p, _) = sample_tree();
    assert!(parse_selector("#btn").unwrap().matches_in_tree(&tree, btn));
    assert!(parse_selector(".anchor").unwrap().matches_in_tree(&tree, btn));
    assert!(parse_selector("BUTTON").unwrap().matches_in_tree(&tree, btn));
    assert!(!parse_selector("#btn").unwrap().matches_in_tree(&tree, p));
}

#[test]
fn test_match_descendant_and_child() {
    let (tree, _, btn, _, _) = sample_tree();
    assert!(parse_selector("#wrapper button").unwrap().matches_in_tree(&tree, btn));
    assert!(parse_selector("div > .anchor").unwrap().matches_in_tree(&tree, btn));
    assert!(!parse_selector("p > .anchor").unwrap().matches_in_tree(&tree, btn));
}

#[test]
fn test_match_sibling_combinators() {
    let (tree, _, _, p, popup) = sample_tree();
    assert!(parse_selector("button + p").unwrap().matches_in_tree(&tree, p));
    assert!(parse_selector("button ~ #popup").unwrap().matches_in_tree(&tree, popup));
    assert!(!parse_selector("button + #popup").unwrap().matches_in_tree(&tree, popup));
}

#[test]
fn test_match_attribute_operators() {
    let (tree, _, btn, _, popup) = sample_tree();
    assert!(parse_selector("[data-anchor-polyfill]").unwrap().matches_in_tree(&tree, popup));
    assert!(parse_selector("[data-anchor-polyfill^=x]").unwrap().matches_in_tree(&tree, popup));
    assert!(parse_selector("[class~=anchor]").unwrap().matches_in_tree(&tree, btn));
    assert!(!parse_selector("[data-anchor-polyfill=x2]").unwrap().matches_in_tree(&tree, popup));
}

#[test]
fn test_match_structural_pseudo_classes() {
    let (tree, wrapper, btn, p, popup) = sample_tree();
    assert!(parse_selector(":root").unwrap().matches_in_tree(&tree, wrapper));
    assert!(parse_selector(":first-child").unwrap().matches_in_tree(&tree, btn));
    assert!(parse_selector(":last-child").unwrap().matches_in_tree(&tree, popup));
    assert!(!parse_selector(":first-child").unwrap().matches_in_tree(&tree, p));
    assert!(parse_selector("p:empty").unwrap().matches_in_tree(&tree, p));
}

#[test]
fn test_match_not_is_where() {
    let (tree, _, btn, p, _) = sample_tree();
    assert!(parse_selector(":not(#btn)").unwrap().matches_in_tree(&tree, p));
    assert!(!parse_selector(":not(#btn, p)").unwrap().matches_in_tree(&tree, p));
    assert!(parse_selector(":is(p, #btn)").unwrap().matches_in_tree(&tree, btn));

    let where_sel = parse_selector(":where(#btn)").unwrap();
    assert!(where_sel.matches_in_tree(&tree, btn));
    assert_eq!(where_sel.specificity, Specificity(0, 0, 0));
    assert_eq!(parse_selector(":is(#btn)").unwrap().specificity, Specificity(1, 0, 0));
}

#[test]
fn test_dynamic_pseudo_class_never_matches() {
    let (tree, _, btn, _, _) = sample_tree();
    let selector = parse_selector("#btn:hover").unwrap();
    assert!(!selector.matches_in_tree(&tree, btn));
}
