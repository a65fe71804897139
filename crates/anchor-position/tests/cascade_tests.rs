//! Integration tests for cascade preprocessing.

use anchor_css::{Declaration, parse_declarations};
use anchor_position::cascade::{expand_inset_shorthand, preprocess, shifted_property_name};
use anchor_position::{StyleRecord, StyleSource};
use quickcheck_macros::quickcheck;

const VALUES: [&str; 5] = ["1px", "2px", "3px", "4px", "5px"];

fn inset(values: &[&str]) -> Declaration {
    parse_declarations(&format!("inset: {}", values.join(" ")))
        .pop()
        .unwrap_or_else(|| Declaration::new("inset", Vec::new()))
}

fn longhands(expanded: &[Declaration]) -> Vec<(String, String)> {
    expanded
        .iter()
        .map(|declaration| (declaration.name.clone(), declaration.value_text()))
        .collect()
}

fn record(css: &str) -> StyleRecord {
    StyleRecord::new(StyleSource::Link { href: "test.css".into() }, css)
}

/// [CSS Box § 5](https://drafts.csswg.org/css-box-4/#margin-shorthand):
/// one value applies to all sides, two to top/bottom and right/left,
/// three to top, right/left and bottom.
#[quickcheck]
fn prop_inset_expansion_matches_shorthand_table(count: u8) -> bool {
    let count = usize::from(count % 6);
    let values = &VALUES[..count];
    let expected: Option<[&str; 4]> = match values {
        &[all] => Some([all, all, all, all]),
        &[vertical, horizontal] => Some([vertical, horizontal, vertical, horizontal]),
        &[top, horizontal, bottom] => Some([top, horizontal, bottom, horizontal]),
        &[top, right, bottom, left] => Some([top, right, bottom, left]),
        _ => None,
    };
    let expanded = expand_inset_shorthand(&inset(values));
    match (expected, expanded) {
        (None, None) => true,
        (Some(expected), Some(expanded)) => {
            let expected: Vec<(String, String)> = ["top", "right", "bottom", "left"]
                .iter()
                .zip(expected)
                .map(|(name, value)| ((*name).to_string(), value.to_string()))
                .collect();
            longhands(&expanded) == expected
        }
        _ => false,
    }
}

#[test]
fn test_logical_inset_shorthands() {
    let block = parse_declarations("inset-block: 1px 2px").pop().unwrap();
    assert_eq!(
        longhands(&expand_inset_shorthand(&block).unwrap()),
        vec![
            ("inset-block-start".to_string(), "1px".to_string()),
            ("inset-block-end".to_string(), "2px".to_string()),
        ]
    );
    let inline = parse_declarations("inset-inline: auto").pop().unwrap();
    assert_eq!(expand_inset_shorthand(&inline).unwrap().len(), 2);
    let three = parse_declarations("inset-inline: 1px 2px 3px").pop().unwrap();
    assert!(expand_inset_shorthand(&three).is_none());
}

#[test]
fn test_var_and_anchor_values() {
    let var = parse_declarations("inset: var(--gap)").pop().unwrap();
    assert!(expand_inset_shorthand(&var).is_none());

    let anchored = parse_declarations("inset: anchor(--a bottom) 0").pop().unwrap();
    let expanded = longhands(&expand_inset_shorthand(&anchored).unwrap());
    assert_eq!(expanded[0], ("top".to_string(), "anchor(--a bottom)".to_string()));
    assert_eq!(expanded[3], ("left".to_string(), "0".to_string()));
}

#[test]
fn test_preprocess_shifts_anchor_properties() {
    let mut records = vec![
        record("#btn { anchor-name: --btn } #popup { position-anchor: --btn; inset: 1px 2px }"),
        record("p { color: red }"),
    ];
    let mut errors = Vec::new();
    assert!(preprocess(&mut records, "tok", &mut errors));
    assert!(errors.is_empty());

    let css = &records[0].css;
    assert!(css.contains(&format!("{}:--btn", shifted_property_name("anchor-name", "tok"))));
    assert!(css.contains("--position-anchor-tok:--btn"));
    assert!(css.contains("top:1px;right:2px;bottom:1px;left:2px"));
    assert!(!css.contains("inset:"));
    assert!(records[0].changed);
    assert!(!records[1].changed);
    assert_eq!(records[1].css, "p { color: red }");
}

#[test]
fn test_preprocess_reports_unparseable_records() {
    let mut records = vec![record("#a { color: red"), record("#b { position-area: top }")];
    let mut errors = Vec::new();
    assert!(preprocess(&mut records, "tok", &mut errors));
    assert_eq!(errors.len(), 1);
    assert_eq!(records[0].css, "#a { color: red");
    assert!(records[1].css.contains("--position-area-tok:top"));
}
