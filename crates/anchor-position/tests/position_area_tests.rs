//! Integration tests for `position-area` pairing and grid mapping.

use anchor_css::parse_component_values;
use anchor_position::position_area::{
    Alignment, GridSpan, Inset, PositionArea, PositionAreaKeyword, wrapper_rule,
};
use quickcheck_macros::quickcheck;
use strum::IntoEnumIterator;

fn parse(text: &str) -> Option<PositionArea> {
    PositionArea::parse(&parse_component_values(text))
}

fn keywords() -> Vec<PositionAreaKeyword> {
    PositionAreaKeyword::iter().collect()
}

/// The table a keyword belongs to, from its spelling alone.
fn table(keyword: PositionAreaKeyword) -> &'static str {
    let name: &str = keyword.as_ref();
    let stem = name.strip_prefix("span-").unwrap_or(name);
    match stem {
        "center" | "all" => "common",
        "left" | "right" => "x",
        "top" | "bottom" => "y",
        "start" | "end" => "logical",
        "self-start" | "self-end" => "self-logical",
        _ if stem.starts_with("x-") => "x",
        _ if stem.starts_with("y-") => "y",
        _ if stem.starts_with("block-") => "block",
        _ if stem.starts_with("inline-") => "inline",
        _ if stem.starts_with("self-block-") => "self-block",
        _ if stem.starts_with("self-inline-") => "self-inline",
        _ => panic!("unclassified keyword {name}"),
    }
}

fn pairs_validly(first: PositionAreaKeyword, second: PositionAreaKeyword) -> bool {
    matches!(
        (table(first), table(second)),
        ("common", _)
            | (_, "common")
            | ("x", "y")
            | ("y", "x")
            | ("block", "inline")
            | ("inline", "block")
            | ("self-block", "self-inline")
            | ("self-inline", "self-block")
            | ("logical", "logical")
            | ("self-logical", "self-logical")
    )
}

#[test]
fn test_every_pair_against_tables() {
    for first in keywords() {
        for second in keywords() {
            let text = format!("{first} {second}");
            assert_eq!(
                parse(&text).is_some(),
                pairs_validly(first, second),
                "unexpected result for `{text}`"
            );
        }
    }
}

#[quickcheck]
fn prop_pairing_is_symmetric(a: usize, b: usize) -> bool {
    let keywords = keywords();
    let first = keywords[a % keywords.len()];
    let second = keywords[b % keywords.len()];
    parse(&format!("{first} {second}")).is_some() == parse(&format!("{second} {first}")).is_some()
}

#[quickcheck]
fn prop_valid_areas_map_inside_the_grid(a: usize, b: usize) -> bool {
    let keywords = keywords();
    let first = keywords[a % keywords.len()];
    let second = keywords[b % keywords.len()];
    parse(&format!("{first} {second}")).is_none_or(|area| {
        let descriptor = area.descriptor("--pa-1");
        [descriptor.block_span, descriptor.inline_span]
            .iter()
            .all(|span| span.start < span.end && span.end <= 3)
    })
}

#[test]
fn test_single_keywords() {
    let center = parse("center").unwrap();
    assert_eq!(center.axes(), (PositionAreaKeyword::Center, PositionAreaKeyword::Center));

    let top = parse("top").unwrap();
    assert_eq!(top.axes(), (PositionAreaKeyword::Top, PositionAreaKeyword::SpanAll));

    let start = parse("span-start").unwrap();
    assert_eq!(start.to_string(), "span-start span-start");
}

#[test]
fn test_rejected_values() {
    assert!(parse("none").is_none());
    assert!(parse("top bottom").is_none());
    assert!(parse("left block-start").is_none());
    assert!(parse("top left center").is_none());
    assert!(parse("").is_none());
}

#[test]
fn test_axis_order_follows_keyword_tables() {
    let area = parse("left top").unwrap();
    assert_eq!(area.axes(), (PositionAreaKeyword::Top, PositionAreaKeyword::Left));
    let area = parse("inline-end block-start").unwrap();
    assert_eq!(
        area.axes(),
        (PositionAreaKeyword::BlockStart, PositionAreaKeyword::InlineEnd)
    );
}

#[test]
fn test_top_left_corner() {
    let descriptor = parse("top left").unwrap().descriptor("--pa-1");
    assert_eq!(descriptor.block_span, GridSpan { start: 0, end: 1 });
    assert_eq!(descriptor.inline_span, GridSpan { start: 0, end: 1 });
    assert_eq!(descriptor.block_inset.start, Inset::Zero);
    assert_eq!(descriptor.block_inset.end, Inset::Top);
    assert_eq!(descriptor.inline_inset.end, Inset::Left);
    assert_eq!(descriptor.block_alignment, Alignment::End);
    assert_eq!(descriptor.inline_alignment, Alignment::End);
}

#[test]
fn test_spanning_bottom() {
    let descriptor = parse("span-bottom span-all").unwrap().descriptor("--pa-2");
    assert_eq!(descriptor.block_span, GridSpan { start: 1, end: 3 });
    assert_eq!(descriptor.block_inset.start, Inset::Top);
    assert_eq!(descriptor.block_inset.end, Inset::Zero);
    assert_eq!(descriptor.block_alignment, Alignment::Start);
    assert_eq!(descriptor.inline_span, GridSpan { start: 0, end: 3 });
    assert_eq!(descriptor.inline_alignment, Alignment::Center);
}

#[test]
fn test_wrapper_rule_forwards_every_placeholder() {
    let rule = wrapper_rule("--pa-wrapper-1", "--pa-2");
    assert!(rule.starts_with("[data-anchor-polyfill-wrapper~=\"--pa-wrapper-1\"]{"));
    assert!(rule.contains("--pa-2-top:var(--pa-wrapper-1-top)"));
    assert!(rule.contains("--pa-2-justify-self:var(--pa-wrapper-1-justify-self)"));
}
