//! Integration tests for try tactics and fallback collection.

use std::collections::BTreeMap;

use anchor_css::parse_css_text;
use anchor_position::SequentialIds;
use anchor_position::fallback::{TryOrder, TryTactic, apply_try_tactic, collect_try_blocks};

fn declarations(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect()
}

#[test]
fn test_flip_block_moves_and_reverts() {
    let flipped = apply_try_tactic(&declarations(&[("bottom", "12px")]), TryTactic::FLIP_BLOCK);
    assert_eq!(flipped, declarations(&[("top", "12px"), ("bottom", "revert")]));
}

#[test]
fn test_flip_block_flips_anchor_sides() {
    let flipped = apply_try_tactic(
        &declarations(&[("bottom", "anchor(top)"), ("top", "anchor(--a top)")]),
        TryTactic::FLIP_BLOCK,
    );
    assert_eq!(
        flipped,
        declarations(&[("top", "anchor(bottom)"), ("bottom", "anchor(--a bottom)")])
    );
}

#[test]
fn test_flip_inline_keeps_block_properties() {
    let flipped = apply_try_tactic(
        &declarations(&[("left", "anchor(--a right)"), ("top", "anchor(--a bottom)")]),
        TryTactic::FLIP_INLINE,
    );
    assert_eq!(
        flipped,
        declarations(&[
            ("right", "anchor(--a left)"),
            ("left", "revert"),
            ("top", "anchor(--a bottom)"),
        ])
    );
}

#[test]
fn test_combined_tactics_compose() {
    let flipped = apply_try_tactic(
        &declarations(&[("top", "anchor(--a bottom)")]),
        TryTactic::FLIP_BLOCK | TryTactic::FLIP_START,
    );
    assert_eq!(
        flipped,
        declarations(&[("right", "anchor(--a left)"), ("top", "revert")])
    );
}

#[test]
fn test_collects_named_and_tactic_fallbacks() {
    let sheet = parse_css_text(
        "@position-try --below { top: anchor(--a bottom); left: 0 }
         #popup {
           position: absolute;
           bottom: anchor(--a top);
           position-try-fallbacks: --below, flip-block, position-area(top left), --missing;
           position-try-order: most-height;
         }",
    );
    let mut ids = SequentialIds::new();
    let collection = collect_try_blocks(&[&sheet], &mut ids);

    let target = &collection.targets["#popup"];
    assert_eq!(target.order, Some(TryOrder::MostHeight));
    assert_eq!(target.fallbacks.len(), 3);
    assert_eq!(
        target.fallbacks[0].declarations,
        declarations(&[("top", "anchor(--a bottom)"), ("left", "0")])
    );
    assert_eq!(
        target.fallbacks[1].declarations,
        declarations(&[("top", "anchor(--a bottom)"), ("bottom", "revert")])
    );
    assert_eq!(
        target.fallbacks[2].declarations,
        declarations(&[("position-area", "top left")])
    );

    let first = &target.fallbacks[0].id;
    let generated = format!("#popup[data-anchor-polyfill=\"{first}\"]");
    assert_eq!(collection.try_selectors[&generated].text, "#popup");
    assert!(collection.css.contains(&format!("{generated}{{")));
}

#[test]
fn test_position_try_shorthand() {
    let sheet = parse_css_text("#popup { position-try: most-width flip-inline, none }");
    let collection = collect_try_blocks(&[&sheet], &mut SequentialIds::new());
    let target = &collection.targets["#popup"];
    assert_eq!(target.order, Some(TryOrder::MostWidth));
    assert_eq!(target.fallbacks.len(), 1);
}

#[test]
fn test_no_fallbacks_no_rules() {
    let sheet = parse_css_text("#popup { top: 0 }");
    let collection = collect_try_blocks(&[&sheet], &mut SequentialIds::new());
    assert!(collection.is_empty());
    assert!(collection.css.is_empty());
}
