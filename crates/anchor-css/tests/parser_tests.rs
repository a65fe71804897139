//! Integration tests for parsing and serializing stylesheets.

use anchor_css::{
    AtRuleBlock, ComponentValue, ParseError, PseudoElement, Rule, parse_component_values,
    parse_css_text, parse_declarations, parse_stylesheet,
};

#[test]
fn test_parse_style_rule() {
    let sheet = parse_css_text("#popup { top: anchor(--btn bottom); position: absolute }");
    assert_eq!(sheet.rules.len(), 1);
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("expected a style rule");
    };
    assert_eq!(rule.selectors[0].text, "#popup");
    assert_eq!(rule.declarations.len(), 2);
    assert_eq!(rule.declarations[0].name, "top");
    assert!(rule.declarations[0].value[0].is_function("anchor"));
}

#[test]
fn test_serialize_is_compact() {
    let sheet = parse_css_text("#a ,  .b { top : anchor( --x  top ) ; left: 0 !important; }");
    assert_eq!(sheet.to_string(), "#a,.b{top:anchor( --x top );left:0!important}");
}

#[test]
fn test_reparse_is_stable() {
    let text = "@media (min-width: 10px) { #a::before { anchor-name: --a } } \
                @position-try --flip { top: anchor(bottom) } \
                @keyframes spin { from { opacity: 0 } }";
    let once = parse_css_text(text).to_string();
    let twice = parse_css_text(&once).to_string();
    assert_eq!(once, twice);
}

#[test]
fn test_at_rule_blocks_by_kind() {
    let sheet = parse_css_text(
        "@media screen { a { top: 0 } } @position-try --x { top: 0 } @keyframes k { to { top: 0 } } @import url(a.css);",
    );
    let kinds: Vec<_> = sheet
        .rules
        .iter()
        .map(|rule| match rule {
            Rule::At(at) => match &at.block {
                Some(AtRuleBlock::Rules(_)) => "rules",
                Some(AtRuleBlock::Declarations(_)) => "declarations",
                Some(AtRuleBlock::Raw(_)) => "raw",
                None => "statement",
            },
            Rule::Style(_) => "style",
        })
        .collect();
    assert_eq!(kinds, ["rules", "declarations", "raw", "statement"]);
}

#[test]
fn test_position_try_prelude() {
    let sheet = parse_css_text("@position-try --flip { bottom: anchor(top) }");
    let Rule::At(at) = &sheet.rules[0] else {
        panic!("expected an at-rule");
    };
    assert_eq!(at.name, "position-try");
    assert_eq!(at.prelude_text(), "--flip");
}

#[test]
fn test_selector_pseudo_element_split() {
    let sheet = parse_css_text("#btn::after, #btn:before, #btn { anchor-name: --a }");
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("expected a style rule");
    };
    assert_eq!(rule.selectors[0].element_part, "#btn");
    assert_eq!(rule.selectors[0].pseudo_element, Some(PseudoElement::After));
    assert_eq!(rule.selectors[1].pseudo_element, Some(PseudoElement::Before));
    assert_eq!(rule.selectors[2].pseudo_element, None);
}

#[test]
fn test_custom_property_name_keeps_case() {
    let declarations = parse_declarations("--My-Prop: 1px; TOP: 0");
    assert_eq!(declarations[0].name, "--My-Prop");
    assert!(declarations[0].is_custom_property());
    assert_eq!(declarations[1].name, "top");
}

#[test]
fn test_important_is_split_off() {
    let declarations = parse_declarations("inset: 1px 2px ! important");
    assert!(declarations[0].important);
    assert_eq!(declarations[0].value_text(), "1px 2px");
}

#[test]
fn test_var_name() {
    let values = parse_component_values("var( --a, 10px)");
    assert_eq!(values[0].var_name(), Some("--a"));
    assert_eq!(ComponentValue::var("--b").to_string(), "var(--b)");
}

#[test]
fn test_strict_parse_reports_errors() {
    assert_eq!(
        parse_stylesheet("a { top: 0 }}"),
        Err(ParseError::UnbalancedBrace)
    );
    assert!(matches!(
        parse_stylesheet("a { top: 0"),
        Err(ParseError::UnterminatedBlock { .. })
    ));
    assert!(matches!(
        parse_stylesheet("a { content: 'x\n' }"),
        Err(ParseError::BadString { .. })
    ));
    assert!(matches!(
        parse_stylesheet("#dangling"),
        Err(ParseError::MissingBlock { .. })
    ));
    assert!(parse_stylesheet("a { top: 0 }").is_ok());
}

#[test]
fn test_tolerant_parse_keeps_valid_rules() {
    let sheet = parse_css_text("a { top: 0 }} b { left: 0 }");
    assert_eq!(sheet.rules.len(), 2);
}
