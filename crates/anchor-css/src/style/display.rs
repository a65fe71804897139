//! CSS Display property types and parsing
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use serde::Serialize;

use crate::parser::ComponentValue;
use anchor_common::warning::warn_once;

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
///
/// "The `<display-outside>` keywords specify the element's outer display type,
/// which is essentially its principal box's role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OuterDisplayType {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout."
    Flow,
    /// Flow layout in a new block formatting context.
    FlowRoot,
    /// "The element lays out its contents using table layout."
    Table,
    /// "The element lays out its contents using flex layout."
    Flex,
    /// "The element lays out its contents using grid layout."
    Grid,
}

/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayValue {
    /// An element that generates a principal box.
    Box {
        /// How the box participates in flow layout.
        outer: OuterDisplayType,
        /// How its descendants are laid out.
        inner: InnerDisplayType,
    },
    /// [§ 2.5 display: contents](https://www.w3.org/TR/css-display-3/#valdef-display-contents)
    Contents,
    /// [§ 2.6 display: none](https://www.w3.org/TR/css-display-3/#valdef-display-none)
    None,
}

impl Default for DisplayValue {
    /// "Initial: inline"
    fn default() -> Self {
        Self::inline()
    }
}

impl DisplayValue {
    /// `display: block`
    #[must_use]
    pub const fn block() -> Self {
        Self::Box {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
        }
    }

    /// `display: inline`
    #[must_use]
    pub const fn inline() -> Self {
        Self::Box {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::Flow,
        }
    }

    /// True for block-level boxes.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(
            self,
            Self::Box {
                outer: OuterDisplayType::Block,
                ..
            }
        )
    }

    /// [CSS Display § 3.2 Block formatting context](https://www.w3.org/TR/css-display-3/#block-formatting-context)
    ///
    /// True when the box's inner display type alone establishes an
    /// independent formatting context (flow-root, table, flex, grid).
    #[must_use]
    pub const fn establishes_formatting_context(self) -> bool {
        matches!(
            self,
            Self::Box {
                inner: InnerDisplayType::FlowRoot
                    | InnerDisplayType::Table
                    | InnerDisplayType::Flex
                    | InnerDisplayType::Grid,
                ..
            }
        )
    }
}

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// Parse a display value from component values.
#[must_use]
pub fn parse_display_value(values: &[ComponentValue]) -> Option<DisplayValue> {
    use InnerDisplayType::{Flex, Flow, FlowRoot, Grid, Table};
    use OuterDisplayType::{Block, Inline};

    let ident = values.iter().find_map(ComponentValue::as_ident)?;
    let (outer, inner) = match ident.to_ascii_lowercase().as_str() {
        "none" => return Some(DisplayValue::None),
        "contents" => return Some(DisplayValue::Contents),
        "block" | "list-item" => (Block, Flow),
        "inline" => (Inline, Flow),
        // [§ 2.4 Combination Display Keywords]
        "flow-root" => (Block, FlowRoot),
        "inline-block" => (Inline, FlowRoot),
        "table" => (Block, Table),
        "inline-table" => (Inline, Table),
        "flex" => (Block, Flex),
        "inline-flex" => (Inline, Flex),
        "grid" => (Block, Grid),
        "inline-grid" => (Inline, Grid),
        _ => {
            let _ = warn_once("CSS", &format!("unsupported display value '{ident}'"));
            return None;
        }
    };
    Some(DisplayValue::Box { outer, inner })
}
