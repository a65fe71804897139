//! Integration tests for stylesheet walks.

use anchor_css::walk::{
    Descend, RuleRef, descriptor_rules, for_each_declaration, split_commas, style_rules,
    trim_whitespace, visit_values, walk_declarations_mut, walk_values_mut,
};
use anchor_css::{ComponentValue, Declaration, parse_component_values, parse_css_text};

#[test]
fn test_context_reports_rule_and_conditions() {
    let sheet = parse_css_text(
        "a { top: 0 } @media print { @supports (display: grid) { b { left: 0 } } } \
         @position-try --x { bottom: 0 }",
    );
    let mut seen = Vec::new();
    for_each_declaration(&sheet, |cx, declaration| {
        let owner = match cx.rule {
            RuleRef::Style { selectors } => selectors[0].text.clone(),
            RuleRef::At { name, .. } => format!("@{name}"),
        };
        seen.push((owner, cx.conditions.to_vec(), declaration.name.clone()));
    });
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), vec![], "top".to_string()),
            (
                "b".to_string(),
                vec!["@media print".to_string(), "@supports (display: grid)".to_string()],
                "left".to_string()
            ),
            ("@position-try".to_string(), vec![], "bottom".to_string()),
        ]
    );
}

#[test]
fn test_insert_after_places_siblings() {
    let mut sheet = parse_css_text("a { top: 1px; left: 2px }");
    let inserted = walk_declarations_mut(&mut sheet, |cx, declaration| {
        if declaration.name == "top" {
            cx.insert_after(Declaration::new("--top-copy", declaration.value.clone()));
        }
    });
    assert!(inserted);
    assert_eq!(sheet.to_string(), "a{top:1px;--top-copy:1px;left:2px}");
}

#[test]
fn test_inserted_declarations_are_not_visited() {
    let mut sheet = parse_css_text("a { top: 1px }");
    let mut visits = 0;
    let _ = walk_declarations_mut(&mut sheet, |cx, declaration| {
        visits += 1;
        cx.insert_after(declaration.clone());
    });
    assert_eq!(visits, 1);
}

#[test]
fn test_walk_values_mut_replaces_nested_functions() {
    let mut values = parse_component_values("calc(anchor(--a top) + anchor(--b bottom))");
    let mut replaced = 0;
    walk_values_mut(&mut values, &mut |value| {
        if value.is_function("anchor") {
            replaced += 1;
            *value = ComponentValue::var(format!("--id{replaced}"));
            return Descend::Skip;
        }
        Descend::Children
    });
    assert_eq!(replaced, 2);
    assert_eq!(
        anchor_css::serialize_values(&values),
        "calc(var(--id1) + var(--id2))"
    );
}

#[test]
fn test_visit_values_is_preorder() {
    let values = parse_component_values("a(b(c))");
    let mut names = Vec::new();
    visit_values(&values, &mut |value| {
        if let ComponentValue::Function { name, .. } = value {
            names.push(name.clone());
        }
    });
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn test_rule_collectors_include_nested() {
    let sheet = parse_css_text(
        "a {} @media screen { b {} @position-try --n { top: 0 } } @position-try --m { left: 0 }",
    );
    assert_eq!(style_rules(&sheet).len(), 2);
    let names: Vec<String> = descriptor_rules(&sheet)
        .iter()
        .map(|(rule, _)| rule.prelude_text())
        .collect();
    assert_eq!(names, ["--n", "--m"]);
}

#[test]
fn test_split_commas_trims_parts() {
    let values = parse_component_values(" --a , flip-block ,--b ");
    let parts: Vec<String> = split_commas(&values)
        .into_iter()
        .map(anchor_css::serialize_values)
        .collect();
    assert_eq!(parts, ["--a", "flip-block", "--b"]);
    assert!(trim_whitespace(&parse_component_values("   ")).is_empty());
}
