//! [CSS Positioned Layout § 2 Choosing A Positioning Scheme](https://www.w3.org/TR/css-position-3/#position-property)

use serde::Serialize;

use crate::parser::ComponentValue;

/// The `position` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Position {
    /// "The box is not a positioned box."
    #[default]
    Static,
    /// Offset relative to its normal-flow position.
    Relative,
    /// Offset within its normal flow and scroll container.
    Sticky,
    /// "The box is taken out of flow."
    Absolute,
    /// Absolute, with the viewport as containing block.
    Fixed,
}

impl Position {
    /// "An absolutely positioned box is a box whose position is absolute or fixed."
    #[must_use]
    pub const fn is_absolutely_positioned(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }

    /// Anything but `static`.
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// Parse a `position` value.
#[must_use]
pub fn parse_position(values: &[ComponentValue]) -> Option<Position> {
    let ident = values.iter().find_map(ComponentValue::as_ident)?;
    match ident.to_ascii_lowercase().as_str() {
        "static" => Some(Position::Static),
        "relative" => Some(Position::Relative),
        "sticky" => Some(Position::Sticky),
        "absolute" => Some(Position::Absolute),
        "fixed" => Some(Position::Fixed),
        _ => None,
    }
}
