//! [§ 5 Overflow management](https://drafts.csswg.org/css-anchor-position-1/#fallback)
//!
//! Position fallbacks become [`TryBlock`]s: named `@position-try` rules,
//! try tactics applied to the target's own declarations, or bare
//! `position-area` values. Each block is also emitted as a rule keyed on
//! `data-anchor-polyfill`, so anchors inside fallbacks resolve like any
//! other.

use std::collections::BTreeMap;

use anchor_common::warning::warn_once;
use anchor_css::walk::{
    Descend, descriptor_rules, significant, split_commas, style_rules, trim_whitespace,
    walk_values_mut,
};
use anchor_css::{CSSToken, ComponentValue, Declaration, Selector, Stylesheet};
use bitflags::bitflags;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ids::IdGenerator;
use crate::position_area::PositionArea;
use crate::syntax::{AnchorSideKeyword, is_accepted_try_property, is_dashed_ident};

/// Attribute selecting the active try block on a target.
pub const TRY_ATTRIBUTE: &str = "data-anchor-polyfill";

bitflags! {
    /// [§ 5.2 The position-try-fallbacks property](https://drafts.csswg.org/css-anchor-position-1/#position-try-fallbacks)
    ///
    /// `<try-tactic> = flip-block || flip-inline || flip-start`, applied in
    /// bit order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TryTactic: u8 {
        /// Mirror across the block axis.
        const FLIP_BLOCK = 1 << 0;
        /// Mirror across the inline axis.
        const FLIP_INLINE = 1 << 1;
        /// Transpose the axes.
        const FLIP_START = 1 << 2;
    }
}

impl TryTactic {
    /// One tactic keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "flip-block" => Some(Self::FLIP_BLOCK),
            "flip-inline" => Some(Self::FLIP_INLINE),
            "flip-start" => Some(Self::FLIP_START),
            _ => None,
        }
    }
}

/// [§ 5.3 The position-try-order property](https://drafts.csswg.org/css-anchor-position-1/#position-try-order-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TryOrder {
    /// Try fallbacks in declaration order.
    Normal,
    /// Prefer the fallback with the widest available area.
    MostWidth,
    /// Prefer the tallest available area.
    MostHeight,
    /// Prefer the largest block size.
    MostBlockSize,
    /// Prefer the largest inline size.
    MostInlineSize,
}

/// One fallback: the declarations to apply when it is tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryBlock {
    /// Generated id, also the [`TRY_ATTRIBUTE`] value selecting it.
    pub id: String,
    /// Accepted try properties and their values.
    pub declarations: BTreeMap<String, String>,
}

const FLIP_BLOCK_PROPERTIES: &[(&str, &str)] = &[
    ("top", "bottom"),
    ("inset-block-start", "inset-block-end"),
    ("margin-top", "margin-bottom"),
    ("margin-block-start", "margin-block-end"),
];

const FLIP_INLINE_PROPERTIES: &[(&str, &str)] = &[
    ("left", "right"),
    ("inset-inline-start", "inset-inline-end"),
    ("margin-left", "margin-right"),
    ("margin-inline-start", "margin-inline-end"),
];

const FLIP_START_PROPERTIES: &[(&str, &str)] = &[
    ("top", "left"),
    ("bottom", "right"),
    ("inset-block-start", "inset-inline-start"),
    ("inset-block-end", "inset-inline-end"),
    ("inset-block", "inset-inline"),
    ("margin-top", "margin-left"),
    ("margin-bottom", "margin-right"),
    ("margin-block-start", "margin-inline-start"),
    ("margin-block-end", "margin-inline-end"),
    ("margin-block", "margin-inline"),
    ("width", "height"),
    ("min-width", "min-height"),
    ("max-width", "max-height"),
    ("block-size", "inline-size"),
    ("min-block-size", "min-inline-size"),
    ("max-block-size", "max-inline-size"),
    ("justify-self", "align-self"),
];

const BLOCK_AXIS_PROPERTIES: &[&str] = &[
    "top",
    "bottom",
    "inset-block-start",
    "inset-block-end",
    "inset-block",
    "margin-top",
    "margin-bottom",
    "margin-block-start",
    "margin-block-end",
    "margin-block",
];

const INLINE_AXIS_PROPERTIES: &[&str] = &[
    "left",
    "right",
    "inset-inline-start",
    "inset-inline-end",
    "inset-inline",
    "margin-left",
    "margin-right",
    "margin-inline-start",
    "margin-inline-end",
    "margin-inline",
];

fn opposite<'a>(table: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    table.iter().find_map(|&(a, b)| {
        if a == name {
            Some(b)
        } else if b == name {
            Some(a)
        } else {
            None
        }
    })
}

/// One tactic of a [`TryTactic`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flip {
    Block,
    Inline,
    Start,
}

impl Flip {
    /// The tactics in `tactic`, in application order.
    fn sequence(tactic: TryTactic) -> impl Iterator<Item = Self> {
        [
            (TryTactic::FLIP_BLOCK, Self::Block),
            (TryTactic::FLIP_INLINE, Self::Inline),
            (TryTactic::FLIP_START, Self::Start),
        ]
        .into_iter()
        .filter(move |(flag, _)| tactic.contains(*flag))
        .map(|(_, flip)| flip)
    }

    /// The property this tactic moves `property` to.
    fn property(self, property: &str) -> Option<&'static str> {
        let table = match self {
            Self::Block => FLIP_BLOCK_PROPERTIES,
            Self::Inline => FLIP_INLINE_PROPERTIES,
            Self::Start => FLIP_START_PROPERTIES,
        };
        opposite(table, property)
    }

    /// True when this tactic mirrors the axis `property` lies on.
    fn mirrors_axis_of(self, property: &str) -> bool {
        match self {
            Self::Block => BLOCK_AXIS_PROPERTIES.contains(&property),
            Self::Inline => INLINE_AXIS_PROPERTIES.contains(&property),
            Self::Start => false,
        }
    }
}

/// Flip one anchor side. Logical sides and percentages measure along the
/// property's own axis, so they only mirror when that axis is flipped.
fn flip_side(value: &mut ComponentValue, flip: Flip, property: &str) -> bool {
    use AnchorSideKeyword as S;
    let on_axis = flip.mirrors_axis_of(property);
    if let ComponentValue::Token(CSSToken::Percentage {
        value: percent,
        int_value,
        ..
    }) = value
    {
        if !on_axis {
            return false;
        }
        *percent = 100.0 - *percent;
        *int_value = int_value.map(|i| 100 - i);
        return true;
    }
    let Some(side) = value.as_ident().and_then(|ident| ident.parse::<S>().ok()) else {
        return false;
    };
    let flipped = match (flip, side) {
        (Flip::Block, S::Top) => S::Bottom,
        (Flip::Block, S::Bottom) | (Flip::Start, S::Left) => S::Top,
        (Flip::Inline, S::Left) => S::Right,
        (Flip::Inline, S::Right) => S::Left,
        (Flip::Start, S::Top) => S::Left,
        (Flip::Start, S::Bottom) => S::Right,
        (Flip::Start, S::Right) => S::Bottom,
        (Flip::Block | Flip::Inline, S::Start) if on_axis => S::End,
        (Flip::Block | Flip::Inline, S::End) if on_axis => S::Start,
        (Flip::Block | Flip::Inline, S::SelfStart) if on_axis => S::SelfEnd,
        (Flip::Block | Flip::Inline, S::SelfEnd) if on_axis => S::SelfStart,
        _ => return false,
    };
    *value = ComponentValue::ident(flipped.as_ref());
    true
}

/// Flip one anchor size: only transposing the axes changes it.
fn flip_size(value: &mut ComponentValue, flip: Flip) -> bool {
    if flip != Flip::Start {
        return false;
    }
    let swapped = match value.as_ident().map(str::to_ascii_lowercase).as_deref() {
        Some("width") => "height",
        Some("height") => "width",
        Some("block") => "inline",
        Some("inline") => "block",
        Some("self-block") => "self-inline",
        Some("self-inline") => "self-block",
        _ => return false,
    };
    *value = ComponentValue::ident(swapped);
    true
}

/// Rewrite the side/size arguments of every `anchor()`/`anchor-size()` in a
/// value. `None` when nothing changed, so untouched text is kept verbatim.
fn flip_anchor_arguments(property: &str, value: &str, flip: Flip) -> Option<String> {
    let mut values = anchor_css::parse_component_values(value);
    let mut changed = false;
    walk_values_mut(&mut values, &mut |cv| {
        let is_size = cv.is_function("anchor-size");
        if let ComponentValue::Function { name, value: args } = cv
            && (is_size || name.eq_ignore_ascii_case("anchor"))
        {
            let end = args.iter().position(ComponentValue::is_comma).unwrap_or(args.len());
            for arg in &mut args[..end] {
                changed |= if is_size {
                    flip_size(arg, flip)
                } else {
                    flip_side(arg, flip, property)
                };
            }
        }
        Descend::Children
    });
    changed.then(|| anchor_css::serialize_values(&values).trim().to_string())
}

fn flip_value(property: &str, value: &str, flip: Flip) -> String {
    if property == "position-area" {
        let area = PositionArea::parse(&anchor_css::parse_component_values(value));
        return area.map_or_else(
            || value.to_string(),
            |area| {
                let flipped = match flip {
                    Flip::Block => area.flip_block(),
                    Flip::Inline => area.flip_inline(),
                    Flip::Start => area.flip_start(),
                };
                flipped.to_string()
            },
        );
    }
    flip_anchor_arguments(property, value, flip).unwrap_or_else(|| value.to_string())
}

/// [§ 5.2 Applying a try tactic](https://drafts.csswg.org/css-anchor-position-1/#apply-a-try-tactic)
///
/// Rename each property to its mirror under the tactics and flip the
/// directional arguments of `anchor()`/`anchor-size()` in its value. A source
/// property that nothing else was renamed onto is set to `revert`, so the
/// authored value stops applying there.
#[must_use]
pub fn apply_try_tactic(
    declarations: &BTreeMap<String, String>,
    tactic: TryTactic,
) -> BTreeMap<String, String> {
    let mut flipped = BTreeMap::new();
    for (property, value) in declarations {
        let mut name = property.clone();
        let mut value = value.clone();
        for flip in Flip::sequence(tactic) {
            value = flip_value(&name, &value, flip);
            if let Some(renamed) = flip.property(&name) {
                name = renamed.to_string();
            }
        }
        let _ = flipped.insert(name, value);
    }
    for property in declarations.keys() {
        if !flipped.contains_key(property) {
            let _ = flipped.insert(property.clone(), "revert".to_string());
        }
    }
    flipped
}

/// Fallbacks for one target selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetFallbacks {
    /// Try blocks in declaration order.
    pub fallbacks: Vec<TryBlock>,
    /// `position-try-order`, if declared.
    pub order: Option<TryOrder>,
}

/// Every target's fallbacks, plus the rules they generate.
#[derive(Debug, Clone, Default)]
pub struct TryCollection {
    /// Target selector text → fallbacks.
    pub targets: BTreeMap<String, TargetFallbacks>,
    /// Generated selector text → the target selector it came from.
    pub try_selectors: BTreeMap<String, Selector>,
    /// One rule per try block.
    pub css: String,
}

impl TryCollection {
    /// True when no target declared fallbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// What one target's rules declared.
#[derive(Default)]
struct TargetSource {
    fallbacks: Option<Vec<ComponentValue>>,
    order: Option<TryOrder>,
    base: BTreeMap<String, String>,
}

fn declarations_map<'a>(
    declarations: impl IntoIterator<Item = &'a Declaration>,
) -> BTreeMap<String, String> {
    declarations
        .into_iter()
        .filter(|declaration| is_accepted_try_property(&declaration.name))
        .map(|declaration| (declaration.name.clone(), declaration.value_text().trim().to_string()))
        .collect()
}

/// `@position-try --name { ... }` (and the older `@try`) by name; later
/// rules replace earlier ones.
fn named_try_rules(sheets: &[&Stylesheet]) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut named = BTreeMap::new();
    for sheet in sheets {
        for (rule, declarations) in descriptor_rules(sheet) {
            if rule.name != "position-try" && rule.name != "try" {
                continue;
            }
            let name = significant(&rule.prelude)
                .first()
                .and_then(|cv| cv.as_ident())
                .filter(|ident| is_dashed_ident(ident))
                .map(str::to_string);
            if let Some(name) = name {
                let _ = named.insert(name, declarations_map(declarations));
            }
        }
    }
    named
}

fn target_sources(sheets: &[&Stylesheet]) -> BTreeMap<Selector, TargetSource> {
    let mut sources: BTreeMap<Selector, TargetSource> = BTreeMap::new();
    for sheet in sheets {
        for rule in style_rules(sheet) {
            for selector in &rule.selectors {
                let source = sources.entry(selector.clone()).or_default();
                source.base.extend(declarations_map(&rule.declarations));
                for declaration in &rule.declarations {
                    match declaration.name.as_str() {
                        "position-try-fallbacks" | "position-try-options" => {
                            source.fallbacks = Some(declaration.value.clone());
                        }
                        "position-try-order" => {
                            source.order = declaration.value_text().trim().parse().ok();
                        }
                        "position-try" => {
                            let values = trim_whitespace(&declaration.value);
                            let order = values
                                .first()
                                .and_then(|cv| cv.as_ident())
                                .and_then(|ident| ident.parse::<TryOrder>().ok());
                            let rest = if order.is_some() { &values[1..] } else { values };
                            source.order = order.or(source.order);
                            source.fallbacks = Some(rest.to_vec());
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    sources
}

/// One `position-try-fallbacks` item: `none`, `--name`, tactics,
/// `--name` plus tactics, or a `position-area` value.
fn try_block_declarations(
    item: &[ComponentValue],
    base: &BTreeMap<String, String>,
    named: &BTreeMap<String, BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    let parts = significant(item);
    if let [ComponentValue::Function { name, value }] = parts.as_slice()
        && name.eq_ignore_ascii_case("position-area")
    {
        let area = PositionArea::parse(value)?;
        return Some(BTreeMap::from([("position-area".to_string(), area.to_string())]));
    }
    let mut rule_name = None;
    let mut tactic = TryTactic::empty();
    for part in &parts {
        let ident = part.as_ident()?;
        if let Some(single) = TryTactic::from_keyword(ident) {
            tactic |= single;
        } else if is_dashed_ident(ident) && rule_name.is_none() {
            rule_name = Some(ident);
        } else {
            let area = PositionArea::parse(item)?;
            return Some(BTreeMap::from([("position-area".to_string(), area.to_string())]));
        }
    }
    let declarations = match rule_name {
        Some(name) => {
            let Some(declarations) = named.get(name) else {
                let _ = warn_once("Fallback", &format!("unknown @position-try rule {name}"));
                return None;
            };
            declarations
        }
        None if tactic.is_empty() => return None,
        None => base,
    };
    Some(apply_try_tactic(declarations, tactic))
}

/// The generated selector for a try block: the attribute goes on the
/// element part, before any pseudo-element.
fn try_selector(selector: &Selector, id: &str) -> Selector {
    let text = format!(
        "{}[{TRY_ATTRIBUTE}=\"{id}\"]{}",
        selector.element_part,
        selector.pseudo_element.map_or("", |pseudo| pseudo.as_str())
    );
    // Keyed by the text the parser will produce for it.
    Selector::new(&anchor_css::serialize_values(&anchor_css::parse_component_values(&text)))
}

/// Collect every target's fallbacks and generate their rules.
pub fn collect_try_blocks(sheets: &[&Stylesheet], ids: &mut dyn IdGenerator) -> TryCollection {
    let named = named_try_rules(sheets);
    let mut collection = TryCollection::default();
    for (selector, source) in target_sources(sheets) {
        let Some(fallbacks) = source.fallbacks else {
            continue;
        };
        let mut target = TargetFallbacks {
            fallbacks: Vec::new(),
            order: source.order,
        };
        for item in split_commas(&fallbacks) {
            if significant(item).first().is_some_and(|cv| cv.as_ident() == Some("none")) {
                continue;
            }
            let Some(declarations) = try_block_declarations(item, &source.base, &named) else {
                continue;
            };
            let block = TryBlock {
                id: ids.next_id("--anchor-try"),
                declarations,
            };
            let generated = try_selector(&selector, &block.id);
            let body: Vec<String> = block
                .declarations
                .iter()
                .map(|(property, value)| format!("{property}:{value}"))
                .collect();
            collection.css.push_str(&format!("{}{{{}}}", generated.text, body.join(";")));
            let _ = collection.try_selectors.insert(generated.text, selector.clone());
            target.fallbacks.push(block);
        }
        log::debug!("{} fallbacks for {}", target.fallbacks.len(), selector.text);
        let _ = collection.targets.insert(selector.text.clone(), target);
    }
    collection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_flip_start_transposes_sizes_and_sides() {
        let flipped = apply_try_tactic(
            &map(&[("top", "anchor(--a bottom)"), ("width", "anchor-size(width)")]),
            TryTactic::FLIP_START,
        );
        assert_eq!(
            flipped,
            map(&[
                ("height", "anchor-size(height)"),
                ("left", "anchor(--a right)"),
                ("top", "revert"),
                ("width", "revert"),
            ])
        );
    }

    #[test]
    fn test_logical_sides_follow_the_property_axis() {
        let flipped = apply_try_tactic(
            &map(&[("top", "anchor(start)"), ("left", "anchor(start)")]),
            TryTactic::FLIP_BLOCK,
        );
        assert_eq!(flipped["bottom"], "anchor(end)");
        assert_eq!(flipped["left"], "anchor(start)");
    }

    #[test]
    fn test_percentages_mirror() {
        let flipped = apply_try_tactic(&map(&[("top", "anchor(--a 25%)")]), TryTactic::FLIP_BLOCK);
        assert_eq!(flipped["bottom"], "anchor(--a 75%)");
    }

    #[test]
    fn test_position_area_flips_keywords() {
        let flipped = apply_try_tactic(
            &map(&[("position-area", "top left")]),
            TryTactic::FLIP_BLOCK | TryTactic::FLIP_INLINE,
        );
        assert_eq!(flipped["position-area"], "bottom right");
    }

    #[test]
    fn test_try_order_parses() {
        assert_eq!("most-block-size".parse(), Ok(TryOrder::MostBlockSize));
        assert_eq!(TryTactic::from_keyword("FLIP-START"), Some(TryTactic::FLIP_START));
    }
}
