//! Computed values for one element or pseudo-element.
//!
//! Values stay as component values: only a handful of properties are ever
//! interpreted, and the rest are looked up as text.

use std::collections::BTreeMap;

use crate::parser::ComponentValue;
use crate::serializer::serialize_values;

use super::display::{DisplayValue, parse_display_value};
use super::position::{Position, parse_position};
use super::writing_mode::{Direction, WritingMode, parse_direction, parse_writing_mode};

/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Property name → value after cascade, inheritance and `var()` substitution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedValues {
    properties: BTreeMap<String, Vec<ComponentValue>>,
}

impl ComputedValues {
    /// The value of `name`, if any declaration or inheritance produced one.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[ComponentValue]> {
        self.properties.get(name).map(Vec::as_slice)
    }

    /// The value serialized and trimmed.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| serialize_values(v).trim().to_string())
    }

    /// The value as a single lowercased keyword.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<String> {
        let mut significant = self.get(name)?.iter().filter(|cv| !cv.is_whitespace());
        let ident = significant.next()?.as_ident()?;
        significant
            .next()
            .is_none()
            .then(|| ident.to_ascii_lowercase())
    }

    /// Set a property.
    pub fn set(&mut self, name: &str, value: Vec<ComponentValue>) {
        let _ = self.properties.insert(name.to_string(), value);
    }

    /// Remove a property, returning its old value.
    pub fn remove(&mut self, name: &str) -> Option<Vec<ComponentValue>> {
        self.properties.remove(name)
    }

    /// All properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ComponentValue])> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The `--*` properties.
    #[must_use]
    pub fn custom_properties(&self) -> BTreeMap<String, Vec<ComponentValue>> {
        self.properties
            .iter()
            .filter(|(k, _)| k.starts_with("--"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Computed `position`.
    #[must_use]
    pub fn position(&self) -> Position {
        self.get("position")
            .and_then(parse_position)
            .unwrap_or_default()
    }

    /// Computed `display`.
    #[must_use]
    pub fn display(&self) -> DisplayValue {
        self.get("display")
            .and_then(parse_display_value)
            .unwrap_or_default()
    }

    /// Computed `direction`.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.get("direction")
            .and_then(parse_direction)
            .unwrap_or_default()
    }

    /// Computed `writing-mode`.
    #[must_use]
    pub fn writing_mode(&self) -> WritingMode {
        self.get("writing-mode")
            .and_then(parse_writing_mode)
            .unwrap_or_default()
    }

    /// [CSS Display § 3 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
    ///
    /// True when the computed `display` is block-level after blockification:
    /// "absolutely positioned elements ... are blockified."
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        match self.display() {
            DisplayValue::None | DisplayValue::Contents => false,
            display => display.is_block_level() || self.position().is_absolutely_positioned(),
        }
    }
}
