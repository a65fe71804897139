//! Property and keyword tables for [CSS Anchor Positioning](https://drafts.csswg.org/css-anchor-position-1/).
//!
//! Pure classification: nothing here allocates state or fails.

use anchor_css::{CSSToken, ComponentValue};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// [§ 3.2 Inset properties](https://drafts.csswg.org/css-position-3/#insets)
const INSET_PROPERTIES: &[&str] = &[
    "left",
    "right",
    "top",
    "bottom",
    "inset-block-start",
    "inset-block-end",
    "inset-inline-start",
    "inset-inline-end",
    "inset-block",
    "inset-inline",
    "inset",
];

const MARGIN_PROPERTIES: &[&str] = &[
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "margin-block",
    "margin-block-start",
    "margin-block-end",
    "margin-inline",
    "margin-inline-start",
    "margin-inline-end",
];

/// [§ 4.1 Box sizing](https://drafts.csswg.org/css-sizing-3/#sizing-properties),
/// physical and logical.
const SIZING_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "block-size",
    "inline-size",
    "min-block-size",
    "min-inline-size",
    "max-block-size",
    "max-inline-size",
];

const SELF_ALIGNMENT_PROPERTIES: &[&str] = &["justify-self", "align-self", "place-self"];

/// Inset properties, shorthands included.
#[must_use]
pub fn is_inset_property(name: &str) -> bool {
    INSET_PROPERTIES.contains(&name)
}

/// Margin properties, shorthands included.
#[must_use]
pub fn is_margin_property(name: &str) -> bool {
    MARGIN_PROPERTIES.contains(&name)
}

/// Sizing properties.
#[must_use]
pub fn is_sizing_property(name: &str) -> bool {
    SIZING_PROPERTIES.contains(&name)
}

/// `justify-self`, `align-self` and `place-self`.
#[must_use]
pub fn is_self_alignment_property(name: &str) -> bool {
    SELF_ALIGNMENT_PROPERTIES.contains(&name)
}

/// Properties where `anchor()` and `anchor-size()` are resolved.
#[must_use]
pub fn accepts_anchor_functions(name: &str) -> bool {
    is_inset_property(name) || is_sizing_property(name) || is_margin_property(name)
}

/// [§ 5.1 The @position-try rule](https://drafts.csswg.org/css-anchor-position-1/#fallback-rule)
///
/// "The following properties are accepted in a @position-try rule":
/// inset, margin, sizing and self-alignment properties, plus
/// `position-anchor` and `position-area`.
#[must_use]
pub fn is_accepted_try_property(name: &str) -> bool {
    accepts_anchor_functions(name)
        || is_self_alignment_property(name)
        || matches!(name, "position-anchor" | "position-area")
}

/// [§ 3.1 The anchor() function](https://drafts.csswg.org/css-anchor-position-1/#anchor-pos)
///
/// `<anchor-side>` keywords. Percentages are handled by [`AnchorSide`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorSideKeyword {
    /// `top`
    Top,
    /// `left`
    Left,
    /// `right`
    Right,
    /// `bottom`
    Bottom,
    /// `start`
    Start,
    /// `end`
    End,
    /// `self-start`
    SelfStart,
    /// `self-end`
    SelfEnd,
    /// `center`
    Center,
    /// `inside`
    Inside,
    /// `outside`
    Outside,
}

/// An `<anchor-side>` argument: a keyword or a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnchorSide {
    /// A side keyword.
    Keyword(AnchorSideKeyword),
    /// A percentage along the axis, without the `%`.
    Percentage(f64),
}

impl AnchorSide {
    /// Classify one component value.
    #[must_use]
    pub fn from_value(value: &ComponentValue) -> Option<Self> {
        match value {
            ComponentValue::Token(CSSToken::Percentage { value, .. }) => {
                Some(Self::Percentage(*value))
            }
            _ => value
                .as_ident()
                .and_then(|ident| ident.parse().ok())
                .map(Self::Keyword),
        }
    }
}

/// [§ 4.1 The anchor-size() function](https://drafts.csswg.org/css-anchor-position-1/#anchor-size-fn)
///
/// `<anchor-size>` keywords.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorSize {
    /// `width`
    Width,
    /// `height`
    Height,
    /// `block`
    Block,
    /// `inline`
    Inline,
    /// `self-block`
    SelfBlock,
    /// `self-inline`
    SelfInline,
}

impl AnchorSize {
    /// Classify one component value.
    #[must_use]
    pub fn from_value(value: &ComponentValue) -> Option<Self> {
        value.as_ident().and_then(|ident| ident.parse().ok())
    }
}

/// True for `<dashed-ident>`s, the only valid anchor names.
#[must_use]
pub fn is_dashed_ident(value: &str) -> bool {
    value.len() > 2 && value.starts_with("--")
}

/// The value when it is exactly one ident, whitespace aside.
#[must_use]
pub fn single_ident(values: &[ComponentValue]) -> Option<&str> {
    match anchor_css::walk::significant(values).as_slice() {
        &[only] => only.as_ident(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_try_properties_include_every_table() {
        for name in INSET_PROPERTIES
            .iter()
            .chain(MARGIN_PROPERTIES)
            .chain(SIZING_PROPERTIES)
            .chain(SELF_ALIGNMENT_PROPERTIES)
        {
            assert!(is_accepted_try_property(name), "{name}");
        }
        assert!(is_accepted_try_property("position-area"));
        assert!(!is_accepted_try_property("color"));
        assert!(!accepts_anchor_functions("justify-self"));
    }

    #[test]
    fn test_side_keywords_round_trip_through_strum() {
        for side in AnchorSideKeyword::iter() {
            assert_eq!(side.as_ref().parse::<AnchorSideKeyword>(), Ok(side));
        }
        assert_eq!(
            "SELF-START".parse::<AnchorSideKeyword>(),
            Ok(AnchorSideKeyword::SelfStart)
        );
    }

    #[test]
    fn test_side_accepts_percentages() {
        let values = anchor_css::parse_component_values("25%");
        assert_eq!(AnchorSide::from_value(&values[0]), Some(AnchorSide::Percentage(25.0)));
        let values = anchor_css::parse_component_values("width");
        assert_eq!(AnchorSide::from_value(&values[0]), None);
        assert_eq!(AnchorSize::from_value(&values[0]), Some(AnchorSize::Width));
    }

    #[test]
    fn test_dashed_ident() {
        assert!(is_dashed_ident("--btn"));
        assert!(!is_dashed_ident("--"));
        assert!(!is_dashed_ident("btn"));
    }
}
