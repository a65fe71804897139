//! CSS Writing Mode and direction
//!
//! [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)

use serde::Serialize;

use crate::parser::ComponentValue;

/// [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)
///
/// "The writing-mode property specifies whether lines of text are laid out
/// horizontally or vertically and the direction in which blocks progress."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum WritingMode {
    /// "Top-to-bottom block flow direction."
    #[default]
    HorizontalTb,
    /// "Right-to-left block flow direction."
    VerticalRl,
    /// "Left-to-right block flow direction."
    VerticalLr,
}

/// [§ 2.1 Specifying Directionality](https://www.w3.org/TR/css-writing-modes-4/#direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Direction {
    /// "Left-to-right directionality."
    #[default]
    Ltr,
    /// "Right-to-left directionality."
    Rtl,
}

/// Parse a writing-mode value, with the legacy SVG spellings.
#[must_use]
pub fn parse_writing_mode(values: &[ComponentValue]) -> Option<WritingMode> {
    let ident = values.iter().find_map(ComponentValue::as_ident)?;
    match ident.to_ascii_lowercase().as_str() {
        "horizontal-tb" | "lr" | "lr-tb" | "rl" | "rl-tb" => Some(WritingMode::HorizontalTb),
        "vertical-rl" | "tb" | "tb-rl" | "sideways-rl" => Some(WritingMode::VerticalRl),
        "vertical-lr" | "sideways-lr" => Some(WritingMode::VerticalLr),
        _ => None,
    }
}

/// Parse a `direction` value.
#[must_use]
pub fn parse_direction(values: &[ComponentValue]) -> Option<Direction> {
    let ident = values.iter().find_map(ComponentValue::as_ident)?;
    match ident.to_ascii_lowercase().as_str() {
        "ltr" => Some(Direction::Ltr),
        "rtl" => Some(Direction::Rtl),
        _ => None,
    }
}
